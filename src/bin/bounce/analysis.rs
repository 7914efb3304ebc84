//! Offline analysis of a rendered buffer

use rustfft::{num_complex::Complex, FftPlanner};

/// Frequency (Hz) of the strongest FFT bin, excluding DC.
///
/// Applies a Hann window over the whole signal. Returns `None` for signals
/// too short to analyse or with no energy.
pub fn dominant_frequency(samples: &[f32], sample_rate: f32) -> Option<f32> {
    let len = samples.len();
    if len < 2 {
        return None;
    }

    let denom = (len - 1) as f32;
    let mut spectrum: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos());
            Complex::new(s * w, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(len);
    fft.process(&mut spectrum);

    let (bin, magnitude) = spectrum[1..len / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm_sqr()))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    if magnitude <= f32::EPSILON {
        return None;
    }
    Some(bin as f32 * sample_rate / len as f32)
}
