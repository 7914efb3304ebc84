#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Nominal device block used to report the update interval.
///
/// Offline stepping always uses [`STEP_SECONDS`](crate::clock::STEP_SECONDS);
/// this only feeds [`RenderConfig::update_interval`].
pub const NOMINAL_BLOCK_FRAMES: usize = 128;

/// Immutable render parameters fixed at context construction
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    channels: usize,
    duration: f64,
    sample_rate: f32,
}

impl RenderConfig {
    /// Validate and build a configuration.
    ///
    /// Channel count and sample rate must be positive. Duration may be zero
    /// (one tick, empty buffer) but not negative or non-finite.
    pub fn new(channels: usize, duration: f64, sample_rate: f32) -> Result<Self, ConfigError> {
        if channels == 0 {
            return Err(ConfigError::Channels(channels));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(ConfigError::Duration(duration));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigError::SampleRate(sample_rate));
        }

        Ok(Self {
            channels,
            duration,
            sample_rate,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Target duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of frames to render: `duration * sample_rate`, truncated
    pub fn frames(&self) -> usize {
        (self.duration * self.sample_rate as f64).floor() as usize
    }

    /// Seconds per nominal device block (`128 / sample_rate`).
    pub fn update_interval(&self) -> f64 {
        NOMINAL_BLOCK_FRAMES as f64 / self.sample_rate as f64
    }

    /// Scheduling lookahead; always zero offline
    pub fn lookahead(&self) -> f64 {
        0.0
    }
}
