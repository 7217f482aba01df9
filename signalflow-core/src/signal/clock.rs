use chrono::TimeDelta;

use crate::{LightStatus, Timestamp};

/// Default length of one light phase
pub const CYCLE_SECONDS: i64 = 30;

/// Lazily evaluated RED/GREEN cycle of a single road.
///
/// There is no timer behind the clock: a road's status is a pure function of
/// the time of its last change and the current time, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalClock {
    cycle_ms: i64,
}

impl Default for SignalClock {
    fn default() -> Self {
        Self::new(CYCLE_SECONDS)
    }
}

impl SignalClock {
    /// Clock with the given phase length. Non-positive lengths are clamped to one second.
    pub fn new(cycle_seconds: i64) -> Self {
        Self {
            cycle_ms: cycle_seconds.max(1).saturating_mul(1000),
        }
    }

    pub fn cycle(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.cycle_ms)
    }

    /// Number of whole cycles between `since` and `now`; zero when `now` is not later
    pub fn elapsed_cycles(&self, since: Timestamp, now: Timestamp) -> i64 {
        let elapsed_ms = (now - since).num_milliseconds();
        if elapsed_ms <= 0 {
            0
        } else {
            elapsed_ms / self.cycle_ms
        }
    }

    /// Advances `(status, last_change)` to `now`.
    ///
    /// The reference time moves forward by whole cycles only, keeping the phase
    /// aligned, and the status flips iff an odd number of cycles elapsed.
    pub fn resolve_status(
        &self,
        last_change: Timestamp,
        status: LightStatus,
        now: Timestamp,
    ) -> (LightStatus, Timestamp) {
        let cycles = self.elapsed_cycles(last_change, now);
        if cycles == 0 {
            return (status, last_change);
        }

        let new_last_change = self
            .cycle_ms
            .checked_mul(cycles)
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|advance| last_change.checked_add_signed(advance))
            .unwrap_or(now);

        let new_status = if cycles % 2 == 1 {
            status.flipped()
        } else {
            status
        };

        (new_status, new_last_change)
    }
}

/// [`SignalClock::resolve_status`] with the default 30 second cycle
pub fn resolve_status(
    last_change: Timestamp,
    status: LightStatus,
    now: Timestamp,
) -> (LightStatus, Timestamp) {
    SignalClock::default().resolve_status(last_change, status, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(seconds: i64) -> Timestamp {
        NaiveDate::from_ymd_opt(2025, 2, 13)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            + TimeDelta::seconds(seconds)
    }

    #[test]
    fn unchanged_within_first_window() {
        let (status, last) = resolve_status(at(0), LightStatus::Red, at(29));
        assert_eq!(status, LightStatus::Red);
        assert_eq!(last, at(0));
    }

    #[test]
    fn odd_cycles_flip_even_cycles_do_not() {
        for cycles in 0..8 {
            let now = at(cycles * 30 + 7);
            let (status, last) = resolve_status(at(0), LightStatus::Green, now);
            let expected = if cycles % 2 == 1 {
                LightStatus::Red
            } else {
                LightStatus::Green
            };
            assert_eq!(status, expected, "cycles = {cycles}");
            assert_eq!(last, at(cycles * 30));
        }
    }

    #[test]
    fn many_windows_apply_only_parity() {
        // 185 s is six whole cycles: same color, reference moved to 180 s
        let (status, last) = resolve_status(at(0), LightStatus::Red, at(185));
        assert_eq!(status, LightStatus::Red);
        assert_eq!(last, at(180));
    }

    #[test]
    fn repeated_reads_in_same_window_are_idempotent() {
        let first = resolve_status(at(0), LightStatus::Red, at(40));
        let second = resolve_status(first.1, first.0, at(45));
        assert_eq!(first, second);
        assert_eq!(first, (LightStatus::Green, at(30)));
    }

    #[test]
    fn time_going_backwards_changes_nothing() {
        let (status, last) = resolve_status(at(60), LightStatus::Green, at(0));
        assert_eq!((status, last), (LightStatus::Green, at(60)));
    }

    #[test]
    fn custom_cycle_length() {
        let clock = SignalClock::new(10);
        assert_eq!(clock.elapsed_cycles(at(0), at(35)), 3);
        let (status, last) = clock.resolve_status(at(0), LightStatus::Red, at(35));
        assert_eq!((status, last), (LightStatus::Green, at(30)));
    }
}
