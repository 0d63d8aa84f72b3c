//! Non-blocking interval timers.

use std::time::{Duration, Instant};

/// Fire-or-skip interval timer driven by caller-supplied instants.
///
/// `ready` never waits: it compares the elapsed time against the period and
/// rearms when it fires. Missed periods are not queued up; a late check fires
/// once and restarts the period from `now`.
#[derive(Debug, Clone, Copy)]
pub struct Every {
    period: Duration,
    last: Instant,
}

impl Every {
    /// Create a timer whose first period starts at `now`
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, last: now }
    }

    /// True (and rearmed) once `period` has elapsed since the last firing
    pub fn ready(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Current period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Change the period without restarting it
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Restart the current period at `now`
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_period() {
        let start = Instant::now();
        let mut timer = Every::new(Duration::from_millis(100), start);

        assert!(!timer.ready(start));
        assert!(!timer.ready(start + Duration::from_millis(99)));
        assert!(timer.ready(start + Duration::from_millis(100)));
        // Rearmed from the firing instant
        assert!(!timer.ready(start + Duration::from_millis(150)));
        assert!(timer.ready(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_late_check_fires_once() {
        let start = Instant::now();
        let mut timer = Every::new(Duration::from_millis(10), start);

        assert!(timer.ready(start + Duration::from_millis(95)));
        assert!(!timer.ready(start + Duration::from_millis(100)));
        assert!(timer.ready(start + Duration::from_millis(105)));
    }

    #[test]
    fn test_clock_going_backwards_does_not_fire() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut timer = Every::new(Duration::from_millis(10), start);
        assert!(!timer.ready(start - Duration::from_millis(500)));
    }

    #[test]
    fn test_reset_and_set_period() {
        let start = Instant::now();
        let mut timer = Every::new(Duration::from_millis(100), start);
        timer.reset(start + Duration::from_millis(90));
        assert!(!timer.ready(start + Duration::from_millis(150)));

        timer.set_period(Duration::from_millis(50));
        assert_eq!(timer.period(), Duration::from_millis(50));
        assert!(timer.ready(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_zero_period_always_fires() {
        let start = Instant::now();
        let mut timer = Every::new(Duration::ZERO, start);
        assert!(timer.ready(start));
        assert!(timer.ready(start));
    }
}
