//! Calendar grid layout
//!
//! Lays out one cell per day on a week-column by weekday-row grid covering
//! the trailing year through the reference date, padded to whole weeks, and
//! places month labels above the columns where a month starts.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::calendar::{
    add_days, day_of_week, end_of_week_saturday, format_date, list_date_range,
    start_of_week_sunday,
};
use crate::types::{IntensityLevel, LevelValue};

/// Side length of a day cell in pixels
pub const CELL_SIZE: u32 = 10;

/// Gap between adjacent cells in pixels
pub const CELL_GAP: u32 = 3;

/// Distance from one cell's origin to the next
pub const CELL_PITCH: u32 = CELL_SIZE + CELL_GAP;

/// Month labels closer than this to the previous label are dropped
pub const MIN_MONTH_LABEL_SPACING: u32 = 28;

/// Days before the reference date included in the trailing year
pub const YEAR_LOOKBACK_DAYS: i64 = 364;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A single day positioned on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionCell {
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// Column, counted from the first rendered week
    pub week: u32,
    /// Row, 0 = Sunday .. 6 = Saturday
    pub day: u8,
    pub level: IntensityLevel,
    /// Horizontal offset within the grid
    pub x: u32,
    /// Vertical offset within the grid
    pub y: u32,
}

/// A month name placed above the column holding the 1st of that month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    /// The 1st of the month (YYYY-MM-DD)
    pub date: String,
    pub text: String,
    pub week: u32,
    pub x: u32,
}

/// First rendered day: the Sunday on or before `end - 364 days`.
pub fn grid_start_date(end_date: NaiveDate) -> NaiveDate {
    start_of_week_sunday(add_days(end_date, -YEAR_LOOKBACK_DAYS))
}

/// Last rendered day: the Saturday on or after `end_date`.
pub fn grid_end_date(end_date: NaiveDate) -> NaiveDate {
    end_of_week_saturday(end_date)
}

/// Build every cell for the year ending at `end_date`.
///
/// Levels are looked up by date; missing dates read as level 0 and
/// out-of-range values are clamped.
pub fn build_contribution_grid<V: LevelValue>(
    levels_by_date: &BTreeMap<String, V>,
    end_date: NaiveDate,
) -> Vec<ContributionCell> {
    let start = grid_start_date(end_date);
    let end = grid_end_date(end_date);

    list_date_range(start, end)
        .into_iter()
        .enumerate()
        .map(|(index, date)| {
            let week = (index / 7) as u32;
            let day = day_of_week(date);
            let key = format_date(date);
            let level = levels_by_date
                .get(&key)
                .map(|value| value.clamped_level())
                .unwrap_or_default();

            ContributionCell {
                date: key,
                week,
                day,
                level,
                x: week * CELL_PITCH,
                y: u32::from(day) * CELL_PITCH,
            }
        })
        .collect()
}

/// Number of week columns spanned by `cells`.
pub fn week_count(cells: &[ContributionCell]) -> u32 {
    cells.iter().map(|cell| cell.week + 1).max().unwrap_or(0)
}

/// Month labels in week order, skipping any that would crowd the previous one.
pub fn build_month_labels(cells: &[ContributionCell]) -> Vec<MonthLabel> {
    let mut first_of_month_by_week: BTreeMap<u32, (u8, NaiveDate, &ContributionCell)> =
        BTreeMap::new();

    for cell in cells {
        let Ok(date) = NaiveDate::parse_from_str(&cell.date, crate::calendar::DATE_FORMAT) else {
            continue;
        };
        if date.day() != 1 {
            continue;
        }
        // A week holds at most one 1st, but keep the earliest row regardless
        let entry = first_of_month_by_week
            .entry(cell.week)
            .or_insert((cell.day, date, cell));
        if cell.day < entry.0 {
            *entry = (cell.day, date, cell);
        }
    }

    let mut labels: Vec<MonthLabel> = Vec::new();
    for (week, (_, date, cell)) in first_of_month_by_week {
        let x = week * CELL_PITCH;
        if let Some(last) = labels.last() {
            if x - last.x < MIN_MONTH_LABEL_SPACING {
                continue;
            }
        }

        labels.push(MonthLabel {
            date: cell.date.clone(),
            text: MONTH_ABBREVIATIONS[date.month0() as usize].to_string(),
            week,
            x,
        });
    }

    labels
}
