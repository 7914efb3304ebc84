//! Timeline of time-based callbacks driven by ticks.
//!
//! The scheduler never looks at a clock itself: whoever drives it passes the
//! current time to [`Scheduler::run_due`]. In an offline context that is the
//! tick subscriber installed at construction, fed by the virtual clock.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Mutex, PoisonError};

use log::trace;

use crate::error::ConfigError;

/// Handle for cancelling a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutId(u64);

enum Callback {
    Once(Box<dyn FnOnce(f64) + Send>),
    Repeat {
        interval: f64,
        callback: Box<dyn FnMut(f64) + Send>,
    },
}

struct Entry {
    time: f64,
    /// Insertion order, breaks ties between equal times
    seq: u64,
    id: TimeoutId,
    callback: Callback,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap; reverse so the earliest entry sits on top.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
            .reverse()
    }
}

#[derive(Default)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_id: u64,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once, `delay` seconds after `now`.
    ///
    /// The callback receives the time it was scheduled for.
    pub fn set_timeout<F>(&mut self, now: f64, delay: f64, callback: F) -> Result<TimeoutId, ConfigError>
    where
        F: FnOnce(f64) + Send + 'static,
    {
        if !delay.is_finite() || delay < 0.0 {
            return Err(ConfigError::Delay(delay));
        }
        let id = self.next_id();
        self.push(now + delay, id, Callback::Once(Box::new(callback)));
        Ok(id)
    }

    /// Run `callback` every `interval` seconds, first at `now + interval`.
    pub fn set_interval<F>(&mut self, now: f64, interval: f64, callback: F) -> Result<TimeoutId, ConfigError>
    where
        F: FnMut(f64) + Send + 'static,
    {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::Interval(interval));
        }
        let id = self.next_id();
        self.push(
            now + interval,
            id,
            Callback::Repeat {
                interval,
                callback: Box::new(callback),
            },
        );
        Ok(id)
    }

    /// Cancel a pending callback; false if it already ran or never existed
    pub fn clear(&mut self, id: TimeoutId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|entry| entry.id != id);
        self.queue.len() != before
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Time of the earliest pending callback
    pub fn next_time(&self) -> Option<f64> {
        self.queue.peek().map(|entry| entry.time)
    }

    /// Run every callback due at or before `now`, earliest first.
    ///
    /// The lock is released while each callback runs. Intervals re-arm at
    /// `time + interval` and fire again in the same call if still due.
    /// Returns the number of callbacks that ran.
    pub fn run_due(shared: &Mutex<Scheduler>, now: f64) -> usize {
        let mut ran = 0;
        loop {
            let due = {
                let mut scheduler = shared.lock().unwrap_or_else(PoisonError::into_inner);
                scheduler.pop_due(now)
            };
            let Some(entry) = due else {
                break;
            };

            trace!("firing {:?} scheduled for {:.3}s at {:.3}s", entry.id, entry.time, now);
            ran += 1;

            match entry.callback {
                Callback::Once(callback) => callback(entry.time),
                Callback::Repeat {
                    interval,
                    mut callback,
                } => {
                    callback(entry.time);
                    let mut scheduler = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    scheduler.push(
                        entry.time + interval,
                        entry.id,
                        Callback::Repeat { interval, callback },
                    );
                }
            }
        }
        ran
    }

    fn pop_due(&mut self, now: f64) -> Option<Entry> {
        match self.queue.peek() {
            Some(entry) if entry.time <= now => self.queue.pop(),
            _ => None,
        }
    }

    fn next_id(&mut self) -> TimeoutId {
        let id = TimeoutId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, time: f64, id: TimeoutId, callback: Callback) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            time,
            seq,
            id,
            callback,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<(&'static str, f64)>>>, Mutex<Scheduler>) {
        (Arc::new(Mutex::new(Vec::new())), Mutex::new(Scheduler::new()))
    }

    #[test]
    fn fires_in_time_order_with_scheduled_time() {
        let (log, shared) = recorder();
        {
            let mut scheduler = shared.lock().unwrap();
            for (name, delay) in [("late", 0.3), ("early", 0.1), ("mid", 0.2)] {
                let log = Arc::clone(&log);
                scheduler
                    .set_timeout(0.0, delay, move |t| log.lock().unwrap().push((name, t)))
                    .unwrap();
            }
        }

        assert_eq!(Scheduler::run_due(&shared, 0.05), 0);
        assert_eq!(Scheduler::run_due(&shared, 0.25), 2);
        assert_eq!(Scheduler::run_due(&shared, 1.0), 1);

        assert_eq!(
            *log.lock().unwrap(),
            [("early", 0.1), ("mid", 0.2), ("late", 0.3)]
        );
        assert!(shared.lock().unwrap().is_empty());
    }

    #[test]
    fn equal_times_keep_insertion_order() {
        let (log, shared) = recorder();
        {
            let mut scheduler = shared.lock().unwrap();
            for name in ["first", "second", "third"] {
                let log = Arc::clone(&log);
                scheduler
                    .set_timeout(0.0, 0.5, move |t| log.lock().unwrap().push((name, t)))
                    .unwrap();
            }
        }

        Scheduler::run_due(&shared, 0.5);
        let names: Vec<_> = log.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn interval_rearms_until_cleared() {
        let (log, shared) = recorder();
        let id = {
            let log = Arc::clone(&log);
            shared
                .lock()
                .unwrap()
                .set_interval(0.0, 0.25, move |t| log.lock().unwrap().push(("tick", t)))
                .unwrap()
        };

        assert_eq!(Scheduler::run_due(&shared, 1.0), 4);
        assert_eq!(shared.lock().unwrap().next_time(), Some(1.25));

        assert!(shared.lock().unwrap().clear(id));
        assert_eq!(Scheduler::run_due(&shared, 10.0), 0);

        let times: Vec<_> = log.lock().unwrap().iter().map(|(_, t)| *t).collect();
        assert_eq!(times, [0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn clear_removes_pending_timeout() {
        let (log, shared) = recorder();
        let id = {
            let log = Arc::clone(&log);
            shared
                .lock()
                .unwrap()
                .set_timeout(0.0, 0.1, move |t| log.lock().unwrap().push(("x", t)))
                .unwrap()
        };

        assert!(shared.lock().unwrap().clear(id));
        assert!(!shared.lock().unwrap().clear(id));
        assert_eq!(Scheduler::run_due(&shared, 1.0), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_delays_and_intervals() {
        let mut scheduler = Scheduler::new();
        assert_eq!(
            scheduler.set_timeout(0.0, -1.0, |_| {}),
            Err(ConfigError::Delay(-1.0))
        );
        assert_eq!(
            scheduler.set_interval(0.0, 0.0, |_| {}),
            Err(ConfigError::Interval(0.0))
        );
        assert!(scheduler.set_interval(0.0, f64::NAN, |_| {}).is_err());
        assert!(scheduler.is_empty());
    }
}
