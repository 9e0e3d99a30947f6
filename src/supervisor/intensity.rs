//! Sliding-window restart governor (§3 `IntensityTracker`, §8 boundary
//! behaviors).

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

/// Tracks restart events within a sliding time window and rejects any
/// event that would push the window's count above `limit`.
///
/// Timestamps are `chrono::DateTime<Utc>` rather than `Instant` so a
/// tracker's window can be inspected and logged in wall-clock terms
/// (matching the teacher's use of `chrono` for timestamped state
/// elsewhere in the crate) instead of an opaque monotonic tick.
///
/// With `limit = 0`, every event is rejected — the Open Question of §9
/// ("semantics when `limit=0` are unspecified") is resolved as "any
/// failure is fatal" (see `DESIGN.md`), which falls out of this
/// implementation without a special case: a window of zero tolerated
/// events plus one new event is always `> limit`.
#[derive(Debug, Clone)]
pub struct IntensityTracker {
    limit: u32,
    period: chrono::Duration,
    events: VecDeque<DateTime<Utc>>,
}

impl IntensityTracker {
    pub fn new(limit: u32, period: Duration) -> Self {
        Self {
            limit,
            period: chrono::Duration::from_std(period).unwrap_or(chrono::Duration::MAX),
            events: VecDeque::new(),
        }
    }

    /// Drops events older than `now - period`, appends `now`, and
    /// returns an error once the window holds more than `limit` events.
    /// The tracker's own count still reflects the rejected event — a
    /// supervisor that gets `Err` is expected to stop, not retry.
    pub fn add_event(&mut self, now: DateTime<Utc>) -> Result<(), ()> {
        while let Some(&oldest) = self.events.front() {
            if now.signed_duration_since(oldest) > self.period {
                self.events.pop_front();
            } else {
                break;
            }
        }
        self.events.push_back(now);
        if self.events.len() as u32 > self.limit {
            Err(())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_exactly_limit_events_per_window() {
        let mut tracker = IntensityTracker::new(2, Duration::from_secs(1));
        let start = Utc::now();
        assert!(tracker.add_event(start).is_ok());
        assert!(tracker.add_event(start).is_ok());
        assert!(tracker.add_event(start).is_err());
    }

    #[test]
    fn old_events_fall_out_of_the_window() {
        let mut tracker = IntensityTracker::new(1, Duration::from_millis(100));
        let start = Utc::now();
        assert!(tracker.add_event(start).is_ok());
        let later = start + chrono::Duration::milliseconds(150);
        assert!(tracker.add_event(later).is_ok());
    }

    #[test]
    fn zero_limit_rejects_the_first_event() {
        let mut tracker = IntensityTracker::new(0, Duration::from_secs(1));
        assert!(tracker.add_event(Utc::now()).is_err());
    }
}
