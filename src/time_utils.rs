// SPDX-License-Identifier: MIT

//! Week-boundary arithmetic for the weekly jobs.
//!
//! A tracking week runs Monday 00:00:00.000 UTC through Sunday
//! 23:59:59.999 UTC, inclusive. Sunday belongs to the week that is
//! ending, not the week about to start.

use chrono::{DateTime, Datelike, Duration, Utc};

/// Inclusive start and end of a tracking week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBounds {
    /// Monday 00:00:00.000 UTC
    pub start: DateTime<Utc>,
    /// Sunday 23:59:59.999 UTC
    pub end: DateTime<Utc>,
}

/// Compute the bounds of the week containing `now`.
///
/// With Sunday-first day indexing (Sunday == 0), the offset back to
/// Monday is `-6` on Sunday and `1 - dow` otherwise.
pub fn current_week_bounds(now: DateTime<Utc>) -> WeekBounds {
    let dow = now.weekday().num_days_from_sunday() as i64;
    let days_to_monday = if dow == 0 { -6 } else { 1 - dow };

    let monday = now.date_naive() + Duration::days(days_to_monday);
    let start = monday
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc();
    let end = (monday + Duration::days(6))
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("end of day is a valid time")
        .and_utc();

    WeekBounds { start, end }
}

/// True when `week_start` is the first Monday of a calendar month,
/// i.e. the previous week's Monday fell in a different month.
///
/// Drives the monthly pause-allowance reset riding on the weekly
/// Monday trigger, so the reset fires exactly once per month.
pub fn starts_new_month(week_start: DateTime<Utc>) -> bool {
    (week_start - Duration::days(7)).month() != week_start.month()
}

/// Document-key fragment for a week, e.g. "2024-03-04".
pub fn week_key(week_start: DateTime<Utc>) -> String {
    week_start.format("%Y-%m-%d").to_string()
}
