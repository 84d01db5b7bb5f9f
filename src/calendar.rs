//! Day-level calendar arithmetic
//!
//! Everything here works in UTC on whole days. Weeks run Sunday through
//! Saturday.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

use crate::error::GraphError;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Truncate a timestamp to its UTC calendar day.
pub fn start_of_utc_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Shift a date by a signed number of days.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    // chrono's range spans roughly +/-262,000 years; saturate at its edges.
    shifted.unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Day of week with 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The Sunday on or before `date`.
pub fn start_of_week_sunday(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(day_of_week(date)))
}

/// The Saturday on or after `date`.
pub fn end_of_week_saturday(date: NaiveDate) -> NaiveDate {
    add_days(date, 6 - i64::from(day_of_week(date)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, GraphError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| GraphError::DateParseError(format!("{value}: {e}")))
}

/// Every day from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn list_date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|day| *day <= end).collect()
}
