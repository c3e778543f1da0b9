use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use thiserror::Error;

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Seconds in a day; offsets must stay strictly inside one day.
const SECONDS_PER_DAY: i32 = 86_400;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DayPolicyError {
    #[error("UTC offset must be within ±24h, got {minutes} minutes")]
    OffsetOutOfRange { minutes: i32 },
}

/// Maps instants to calendar days for streak bookkeeping.
///
/// A day starts at midnight in one fixed UTC offset. The app uses the device offset captured at
/// start-up; tests use UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPolicy {
    offset: FixedOffset,
}

impl DayPolicy {
    /// Calendar days start at UTC midnight.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Calendar days start at local midnight, using the current local offset.
    #[must_use]
    pub fn local() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }

    /// Calendar days start at midnight in `minutes` east of UTC.
    ///
    /// # Errors
    ///
    /// Returns `DayPolicyError::OffsetOutOfRange` if the offset is a day or more.
    pub fn with_offset_minutes(minutes: i32) -> Result<Self, DayPolicyError> {
        minutes
            .checked_mul(60)
            .and_then(|secs| {
                if secs.abs() < SECONDS_PER_DAY {
                    FixedOffset::east_opt(secs)
                } else {
                    None
                }
            })
            .map(|offset| Self { offset })
            .ok_or(DayPolicyError::OffsetOutOfRange { minutes })
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date of `at` under this policy.
    #[must_use]
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// True if `later` falls on the calendar day right after `earlier`.
    #[must_use]
    pub fn is_next_day(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> bool {
        self.day_of(earlier).succ_opt() == Some(self.day_of(later))
    }
}

impl Default for DayPolicy {
    fn default() -> Self {
        Self::utc()
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fixed_clock_is_stable() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), fixed_now());
        assert_eq!(clock.now(), clock.now());
        assert!(Clock::default_clock().now() > fixed_now());
    }

    #[test]
    fn day_of_respects_offset() {
        // 2023-11-14T22:13:20Z is already the 15th two hours east of UTC.
        let utc = DayPolicy::utc();
        let east = DayPolicy::with_offset_minutes(120).unwrap();
        assert_eq!(utc.day_of(fixed_now()).to_string(), "2023-11-14");
        assert_eq!(east.day_of(fixed_now()).to_string(), "2023-11-15");
    }

    #[test]
    fn next_day_is_calendar_based() {
        let policy = DayPolicy::utc();
        let late = fixed_now();
        let early_next = late + Duration::hours(2);
        assert!(policy.is_next_day(late, early_next));
        assert!(!policy.is_next_day(late, late + Duration::hours(1)));
        assert!(!policy.is_next_day(late, late + Duration::hours(26)));
    }

    #[test]
    fn rejects_offsets_of_a_day_or_more() {
        assert!(DayPolicy::with_offset_minutes(-330).is_ok());
        assert_eq!(
            DayPolicy::with_offset_minutes(1440),
            Err(DayPolicyError::OffsetOutOfRange { minutes: 1440 })
        );
        assert!(DayPolicy::with_offset_minutes(i32::MAX).is_err());
    }
}
