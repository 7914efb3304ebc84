use std::f32::consts::TAU;

use crate::graph::node::{GraphNode, RenderCtx};

/// Waveform produced by an [`OscNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
    Triangle,
    Noise,
}

/// Phase-accumulating oscillator.
///
/// Tracks the note pitch from [`RenderCtx`] unless a fixed frequency is set.
/// Phase restarts on every note-on, so repeated hits render identically.
pub struct OscNode {
    waveform: Waveform,
    /// Normalised phase in [0, 1)
    phase: f32,
    fixed_frequency: Option<f32>,
    noise_state: u32,
}

const NOISE_SEED: u32 = 0x9E37_79B9;

impl OscNode {
    fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            fixed_frequency: None,
            noise_state: NOISE_SEED,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn noise() -> Self {
        Self::new(Waveform::Noise)
    }

    /// Ignore the note pitch and always play `freq` Hz (clicks, drums)
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.fixed_frequency = Some(freq);
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    fn next_noise(&mut self) -> f32 {
        // xorshift32
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    #[inline]
    fn sample_at(&mut self, phase: f32) -> f32 {
        match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Noise => self.next_noise(),
        }
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let frequency = self.fixed_frequency.unwrap_or(ctx.frequency);
        let increment = frequency / ctx.sample_rate;

        for sample in out.iter_mut() {
            *sample = self.sample_at(self.phase);
            self.phase += increment;
            self.phase -= self.phase.floor();
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.phase = 0.0;
        self.noise_state = NOISE_SEED;
    }
}
