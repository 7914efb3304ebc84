// Purpose - rendered output handed back to callers

/// Planar, non-interleaved audio produced by an offline render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: f32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Silent buffer with `channels` channels of `frames` samples each
    pub fn silent(channels: usize, frames: usize, sample_rate: f32) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn number_of_channels(&self) -> usize {
        self.channels.len()
    }

    /// Length in frames
    pub fn length(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        self.length() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Largest absolute sample across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }

    /// Root-mean-square level across all channels
    pub fn rms(&self) -> f32 {
        let count: usize = self.channels.iter().map(Vec::len).sum();
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .channels
            .iter()
            .flat_map(|c| c.iter())
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        (sum / count as f64).sqrt() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_buffer_shape() {
        let buffer = AudioBuffer::silent(2, 441, 44_100.0);
        assert_eq!(buffer.number_of_channels(), 2);
        assert_eq!(buffer.length(), 441);
        assert!((buffer.duration() - 0.01).abs() < 1e-9);
        assert_eq!(buffer.peak(), 0.0);
        assert_eq!(buffer.rms(), 0.0);
    }

    #[test]
    fn levels() {
        let buffer = AudioBuffer {
            sample_rate: 4.0,
            channels: vec![vec![1.0, -1.0, 1.0, -1.0], vec![0.5, -0.5, 0.5, -0.5]],
        };
        assert_eq!(buffer.peak(), 1.0);
        // mean square = (4 * 1.0 + 4 * 0.25) / 8 = 0.625
        assert!((buffer.rms() - 0.625f32.sqrt()).abs() < 1e-6);
        assert_eq!(buffer.channel(1).map(|c| c[0]), Some(0.5));
        assert!(buffer.channel(2).is_none());
    }

    #[test]
    fn empty_buffer() {
        let buffer = AudioBuffer::silent(1, 0, 48_000.0);
        assert_eq!(buffer.length(), 0);
        assert_eq!(buffer.duration(), 0.0);
    }
}
