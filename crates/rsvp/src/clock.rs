//! Wall-clock access and a virtual clock for deterministic tests.
//!
//! TestClock advances only when told to, firing registered interval timers
//! as it goes, so countdown ticks can be exercised without real waiting.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Identifies a timer registered with [`TestClock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub usize);

/// Entry for a pending timer.
#[derive(Debug, Clone)]
struct TimerEntry {
    /// When the timer should fire (virtual time in ms)
    fire_at_ms: u64,
    timer_id: TimerId,
    /// The interval for re-scheduling
    interval_ms: u64,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at_ms == other.fire_at_ms
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smaller fire_at_ms comes first
        other.fire_at_ms.cmp(&self.fire_at_ms)
    }
}

/// Virtual time clock for testing.
pub struct TestClock {
    current_time_ms: u64,
    pending_timers: BinaryHeap<TimerEntry>,
}

impl TestClock {
    /// Create a TestClock starting at `start_ms`.
    pub fn starting_at(start_ms: u64) -> Self {
        Self {
            current_time_ms: start_ms,
            pending_timers: BinaryHeap::new(),
        }
    }

    /// Register a repeating timer, first firing one interval from now.
    pub fn register_interval(&mut self, timer_id: TimerId, interval_ms: u64) {
        self.pending_timers.push(TimerEntry {
            fire_at_ms: self.current_time_ms + interval_ms,
            timer_id,
            interval_ms,
        });
    }

    /// Stop a timer from firing again.
    pub fn clear_interval(&mut self, timer_id: TimerId) {
        self.pending_timers.retain(|entry| entry.timer_id != timer_id);
    }

    /// Advance virtual time by `ms`.
    ///
    /// Returns each firing as `(timer, fire time)`, in firing order.
    /// Repeating timers are re-scheduled so they can fire again within the same advance.
    pub fn advance_by(&mut self, ms: u64) -> Vec<(TimerId, u64)> {
        let target_time = self.current_time_ms + ms;
        let mut fired = Vec::new();

        while let Some(entry) = self.pending_timers.peek() {
            if entry.fire_at_ms > target_time {
                break;
            }
            let Some(entry) = self.pending_timers.pop() else {
                break;
            };
            fired.push((entry.timer_id, entry.fire_at_ms));
            self.pending_timers.push(TimerEntry {
                fire_at_ms: entry.fire_at_ms + entry.interval_ms.max(1),
                ..entry
            });
        }

        self.current_time_ms = target_time;
        fired
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.pending_timers.is_empty()
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.current_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_increases_time() {
        let mut clock = TestClock::starting_at(500);
        clock.advance_by(1000);
        assert_eq!(clock.now_ms(), 1500);
    }

    #[test]
    fn timer_fires_at_deadline() {
        let mut clock = TestClock::starting_at(0);
        let timer = TimerId(0);
        clock.register_interval(timer, 1000);

        assert!(clock.advance_by(500).is_empty());
        assert_eq!(clock.advance_by(500), vec![(timer, 1000)]);
        assert_eq!(clock.advance_by(1000), vec![(timer, 2000)]);
    }

    #[test]
    fn multiple_fires_in_single_advance() {
        let mut clock = TestClock::starting_at(0);
        clock.register_interval(TimerId(0), 100);
        assert_eq!(clock.advance_by(350).len(), 3);
    }

    #[test]
    fn cleared_timer_stops_firing() {
        let mut clock = TestClock::starting_at(0);
        clock.register_interval(TimerId(1), 100);
        clock.clear_interval(TimerId(1));
        assert!(!clock.has_pending_timers());
        assert!(clock.advance_by(1000).is_empty());
    }
}
