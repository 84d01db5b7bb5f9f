//! Intensity normalization
//!
//! This module turns activity records into per-day intensity levels:
//! - Durations summed per calendar date and floored to whole minutes
//! - Boundaries derived once over the whole date set
//! - Each day bucketed independently into `0..=4`

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::boundaries::{derive_intensity_boundaries, Boundaries};
use crate::calendar::{format_date, list_date_range};
use crate::types::{ActivityRecord, IntensityLevel, LevelsByDate, MinuteValue, MinutesByDate};

/// Sum activity durations per calendar date, in whole minutes.
///
/// Records without a date, or with a missing, negative or non-finite
/// duration, are skipped. Seconds accumulate before flooring, so two
/// 30-second sessions on the same day make one minute.
pub fn aggregate_minutes_by_date(activities: &[ActivityRecord]) -> MinutesByDate {
    let mut seconds_by_date: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = 0_usize;

    for activity in activities {
        let Some((date, seconds)) = activity.usable() else {
            skipped += 1;
            continue;
        };
        *seconds_by_date.entry(date.to_string()).or_insert(0.0) += seconds;
    }

    if skipped > 0 {
        debug!(skipped, total = activities.len(), "skipped malformed activity records");
    }

    seconds_by_date
        .into_iter()
        .map(|(date, seconds)| (date, (seconds / 60.0).sanitized_minutes()))
        .collect()
}

/// Bucket a minute count against derived boundaries.
pub fn bucket_minutes<M: MinuteValue>(minutes: M, boundaries: &Boundaries) -> IntensityLevel {
    let normalized = minutes.sanitized_minutes();
    if normalized == 0 {
        return IntensityLevel::NONE;
    }

    let level = boundaries
        .as_array()
        .iter()
        .filter(|&&boundary| normalized > boundary)
        .count();
    IntensityLevel::new(level.min(4) as u8)
}

/// Map every date's minutes to an intensity level.
///
/// Boundaries are derived once from all values, including zero days, so the
/// caller decides the window by choosing which dates to pass in.
pub fn normalize_minutes_by_date<M: MinuteValue>(
    minutes_by_date: &BTreeMap<String, M>,
) -> LevelsByDate {
    let sanitized: MinutesByDate = minutes_by_date
        .iter()
        .map(|(date, minutes)| (date.clone(), minutes.sanitized_minutes()))
        .collect();

    let values: Vec<u64> = sanitized.values().copied().collect();
    let boundaries = derive_intensity_boundaries(&values);
    debug!(?boundaries, days = values.len(), "derived intensity boundaries");

    sanitized
        .into_iter()
        .map(|(date, minutes)| (date, bucket_minutes(minutes, &boundaries)))
        .collect()
}

/// One entry per day in `start..=end`, missing days defaulting to zero.
///
/// Entries outside the range are dropped.
pub fn fill_date_range<V: Copy + Default>(
    values_by_date: &BTreeMap<String, V>,
    start: NaiveDate,
    end: NaiveDate,
) -> BTreeMap<String, V> {
    list_date_range(start, end)
        .into_iter()
        .map(|date| {
            let key = format_date(date);
            let value = values_by_date.get(&key).copied().unwrap_or_default();
            (key, value)
        })
        .collect()
}
