/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz)
/// - velocity: Intensity/loudness (0.0-127.0, MIDI-style)
/// - time: Simulated time of the first frame in the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn from_note(sample_rate: f32, note: u8, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency: midi_note_to_freq(note),
            velocity,
            time: 0.0,
        }
    }

    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
            time: 0.0,
        }
    }

    /// Same context, positioned at `time`
    pub fn at(self, time: f64) -> Self {
        Self { time, ..self }
    }
}

/// Core trait for audio processing graph nodes
///
/// The offline engine calls `note_on`/`note_off` at the frame a scheduled
/// message lands on, then keeps pulling blocks with `render_block`.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a note starts
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Triggered when a note is released
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }
}

impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-4);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-3);
    }

    #[test]
    fn at_keeps_pitch() {
        let ctx = RenderCtx::from_freq(48_000.0, 1_000.0, 100.0).at(0.25);
        assert_eq!(ctx.time, 0.25);
        assert_eq!(ctx.frequency, 1_000.0);
    }
}
