//! Time sources.
//!
//! Everything that asks "what time is it" inside an offline render goes
//! through a [`TimeSource`]. The offline context hands out
//! [`VirtualTimeSource`] readers; only the context's own [`VirtualClock`]
//! can move simulated time forward.

use std::sync::{atomic::Ordering, Arc};
use std::time::Instant;

use atomic_float::AtomicF64;

/// Fixed simulation step: 5 ms of simulated time per tick
pub const STEP_SECONDS: f64 = 0.005;

/// Anything that can answer "what time is it", in seconds.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> f64;
}

/// Which kind of clock drives a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Simulated time, advanced in fixed steps
    Offline,
    /// Wall-clock time
    Realtime,
}

/// Read-only view of a virtual clock
#[derive(Clone)]
pub struct VirtualTimeSource {
    seconds: Arc<AtomicF64>,
}

impl std::fmt::Debug for VirtualTimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualTimeSource")
            .field("now", &self.now())
            .finish()
    }
}

impl TimeSource for VirtualTimeSource {
    fn now(&self) -> f64 {
        self.seconds.load(Ordering::Acquire)
    }
}

/// Writer side of the simulated clock.
///
/// Time is kept as a step count; the published value is always
/// `steps * STEP_SECONDS`.
pub(crate) struct VirtualClock {
    steps: u64,
    seconds: Arc<AtomicF64>,
}

impl VirtualClock {
    pub(crate) fn new() -> Self {
        Self {
            steps: 0,
            seconds: Arc::new(AtomicF64::new(0.0)),
        }
    }

    pub(crate) fn now(&self) -> f64 {
        self.seconds.load(Ordering::Acquire)
    }

    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }

    /// Move forward by one [`STEP_SECONDS`]
    pub(crate) fn advance(&mut self) {
        self.steps += 1;
        self.seconds
            .store(self.steps as f64 * STEP_SECONDS, Ordering::Release);
    }

    pub(crate) fn reader(&self) -> VirtualTimeSource {
        VirtualTimeSource {
            seconds: Arc::clone(&self.seconds),
        }
    }
}

/// Wall-clock time elapsed since the source was created
#[derive(Debug, Clone, Copy)]
pub struct RealtimeSource {
    origin: Instant,
}

impl RealtimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for RealtimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for RealtimeSource {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), 0.0);
        assert_eq!(clock.reader().now(), 0.0);
    }

    #[test]
    fn readers_follow_the_writer() {
        let mut clock = VirtualClock::new();
        let reader = clock.reader();
        let other = reader.clone();

        clock.advance();
        clock.advance();

        assert_eq!(clock.steps(), 2);
        assert_eq!(reader.now(), 2.0 * STEP_SECONDS);
        assert_eq!(other.now(), reader.now());
    }

    #[test]
    fn step_count_avoids_drift() {
        let mut clock = VirtualClock::new();
        for _ in 0..200 {
            clock.advance();
        }
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn realtime_source_moves_forward() {
        let source = RealtimeSource::new();
        let a = source.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(source.now() > a);
    }

    #[test]
    fn sources_are_interchangeable() {
        let clock = VirtualClock::new();
        let sources: Vec<Box<dyn TimeSource>> =
            vec![Box::new(clock.reader()), Box::new(RealtimeSource::new())];
        assert!(sources.iter().all(|s| s.now() >= 0.0));
    }
}
