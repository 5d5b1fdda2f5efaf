//! Date-only arithmetic
//!
//! All scheduling math works on calendar days without a time-of-day
//! component. Durations are inclusive: a 1-day task starts and ends on
//! the same date.

use chrono::{Duration, NaiveDate};

/// Shifts a date by a signed number of days, or `None` when out of range
pub fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// The day after `date`
pub fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Last day of an inclusive span: `start + duration - 1`
///
/// A zero duration is treated as a single day.
pub fn span_end(start: NaiveDate, duration_days: u32) -> Option<NaiveDate> {
    shift(start, i64::from(duration_days.max(1)) - 1)
}

/// Inclusive day count of `start..=end`, or `None` if `end` precedes `start`
pub fn span_days(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    let days = days_between(start, end) + 1;
    u32::try_from(days).ok().filter(|d| *d > 0)
}
