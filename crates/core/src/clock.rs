//! Clock module - gravity cycle accounting
//!
//! The clock never reads the wall clock itself; the caller feeds it the time
//! that passed since the previous update. That keeps gravity deterministic in
//! tests and lets the host pick its own frame pacing.

use std::time::Duration;

/// Fixed-rate cycle counter driven by caller-supplied elapsed time
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    period: Duration,
    accumulated: Duration,
    paused: bool,
}

impl Clock {
    /// Create a running clock at `cycles_per_second`
    pub fn new(cycles_per_second: f32) -> Self {
        Self {
            period: period_for(cycles_per_second),
            accumulated: Duration::ZERO,
            paused: false,
        }
    }

    /// Change the cycle rate; accumulated progress is kept
    pub fn set_rate(&mut self, cycles_per_second: f32) {
        self.period = period_for(cycles_per_second);
    }

    /// Current rate in cycles per second
    pub fn rate(&self) -> f32 {
        1.0 / self.period.as_secs_f32()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Drop accumulated progress; rate and pause state are unchanged
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    /// Advance by `elapsed` unless paused; time passed while paused is discarded
    pub fn update(&mut self, elapsed: Duration) {
        if self.paused {
            return;
        }
        self.accumulated = self.accumulated.saturating_add(elapsed);
    }

    /// Consume one cycle if a full period has accumulated
    ///
    /// Leftover progress carries over, so repeated calls catch up when
    /// several cycles elapsed at once.
    pub fn has_elapsed_cycle(&mut self) -> bool {
        if self.accumulated >= self.period {
            self.accumulated -= self.period;
            true
        } else {
            false
        }
    }

    /// Progress towards the next cycle
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(crate::types::BASE_SPEED)
    }
}

/// Period of one cycle; non-finite or non-positive rates stall the clock
/// instead of panicking.
fn period_for(cycles_per_second: f32) -> Duration {
    if cycles_per_second.is_finite() && cycles_per_second > 0.0 {
        Duration::try_from_secs_f32(1.0 / cycles_per_second).unwrap_or(Duration::MAX)
    } else {
        Duration::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_cycle_after_one_period() {
        let mut clock = Clock::new(1.0);
        clock.update(ms(999));
        assert!(!clock.has_elapsed_cycle());
        clock.update(ms(1));
        assert!(clock.has_elapsed_cycle());
        assert!(!clock.has_elapsed_cycle());
    }

    #[test]
    fn test_catch_up_keeps_remainder() {
        let mut clock = Clock::new(4.0); // 250ms period
        clock.update(ms(800));
        assert!(clock.has_elapsed_cycle());
        assert!(clock.has_elapsed_cycle());
        assert!(clock.has_elapsed_cycle());
        assert!(!clock.has_elapsed_cycle());
        // 50ms left over
        clock.update(ms(199));
        assert!(!clock.has_elapsed_cycle());
        clock.update(ms(1));
        assert!(clock.has_elapsed_cycle());
    }

    #[test]
    fn test_paused_discards_time() {
        let mut clock = Clock::new(1.0);
        clock.set_paused(true);
        clock.update(Duration::from_secs(3600));
        assert!(!clock.has_elapsed_cycle());
        assert_eq!(clock.accumulated(), Duration::ZERO);

        clock.set_paused(false);
        clock.update(ms(500));
        assert!(!clock.has_elapsed_cycle());
    }

    #[test]
    fn test_reset_keeps_rate_and_pause() {
        let mut clock = Clock::new(4.0);
        clock.update(ms(200));
        clock.set_paused(true);
        clock.reset();

        assert_eq!(clock.accumulated(), Duration::ZERO);
        assert!(clock.is_paused());
        assert_eq!(clock.period(), ms(250));
    }

    #[test]
    fn test_set_rate_applies_to_next_check() {
        let mut clock = Clock::new(1.0);
        clock.update(ms(100));
        assert!(!clock.has_elapsed_cycle());
        clock.set_rate(25.0); // 40ms period
        assert!(clock.has_elapsed_cycle());
        assert!(clock.has_elapsed_cycle());
        assert!(!clock.has_elapsed_cycle());
    }

    #[test]
    fn test_bad_rate_never_fires() {
        let mut clock = Clock::new(0.0);
        clock.update(Duration::from_secs(1_000_000));
        assert!(!clock.has_elapsed_cycle());

        clock.set_rate(f32::NAN);
        assert!(!clock.has_elapsed_cycle());
    }
}
