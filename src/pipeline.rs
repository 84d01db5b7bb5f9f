//! Pipeline orchestration
//!
//! This module provides the public API for git-big.
//! It runs the full flow from activity records to rendered graphs.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::{add_days, parse_iso_date, start_of_utc_day};
use crate::error::GraphError;
use crate::grid::{grid_end_date, grid_start_date, YEAR_LOOKBACK_DAYS};
use crate::normalizer::{aggregate_minutes_by_date, fill_date_range, normalize_minutes_by_date};
use crate::render::{render_contribution_graph, RenderOptions};
use crate::theme::{GraphTheme, Palette};
use crate::types::{ActivityRecord, LevelsByDate, MinutesByDate};

/// Everything produced for one reference date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphArtifacts {
    pub end_date: NaiveDate,
    /// Minutes for every rendered day (whole weeks around the trailing year)
    pub minutes_by_date: MinutesByDate,
    /// Levels for the trailing year, `end - 364 ..= end`
    pub levels_by_date: LevelsByDate,
    /// Valid activity records dated inside the trailing year
    pub session_count: u64,
    pub dark_svg: String,
    pub light_svg: String,
}

impl GraphArtifacts {
    /// The rendered graph for one theme
    pub fn svg(&self, theme: GraphTheme) -> &str {
        match theme {
            GraphTheme::Dark => &self.dark_svg,
            GraphTheme::Light => &self.light_svg,
        }
    }

    /// Trailing-year levels as pretty JSON, keys ascending, newline terminated
    pub fn levels_json(&self) -> Result<String, GraphError> {
        let json = serde_json::to_string_pretty(&self.levels_by_date)?;
        Ok(json + "\n")
    }
}

/// Resolve the reference end date.
///
/// Unset means today (UTC); anything else must be a valid `YYYY-MM-DD` date.
pub fn parse_end_date(configured: Option<&str>) -> Result<NaiveDate, GraphError> {
    match configured.map(str::trim) {
        None | Some("") => Ok(start_of_utc_day(Utc::now())),
        Some(value) => {
            parse_iso_date(value).map_err(|_| GraphError::InvalidEndDate(value.to_string()))
        }
    }
}

/// Render activity records with default display settings.
///
/// # Example
/// ```ignore
/// let artifacts = activities_to_graph(&records, parse_end_date(Some("2026-02-19"))?);
/// std::fs::write("git-big.svg", &artifacts.dark_svg)?;
/// ```
pub fn activities_to_graph(activities: &[ActivityRecord], end_date: NaiveDate) -> GraphArtifacts {
    GraphProcessor::new().process(activities, end_date)
}

/// Display settings shared by every graph a caller renders.
#[derive(Debug, Clone, Default)]
pub struct GraphProcessor {
    title: Option<String>,
    palette: Option<Palette>,
}

impl GraphProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Use one palette for both themes instead of each theme's own
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Run the full pipeline.
    ///
    /// Stages:
    /// 1. Aggregate records into minutes per date
    /// 2. Normalize levels over the trailing year only
    /// 3. Fill minutes and levels across the whole rendered grid
    /// 4. Render dark and light graphs from the same data
    pub fn process(&self, activities: &[ActivityRecord], end_date: NaiveDate) -> GraphArtifacts {
        let minutes_by_date = aggregate_minutes_by_date(activities);

        let year_start = add_days(end_date, -YEAR_LOOKBACK_DAYS);
        let year_minutes = fill_date_range(&minutes_by_date, year_start, end_date);
        let levels_by_date = normalize_minutes_by_date(&year_minutes);

        let render_start = grid_start_date(end_date);
        let render_end = grid_end_date(end_date);
        let filled_minutes = fill_date_range(&minutes_by_date, render_start, render_end);
        let filled_levels = fill_date_range(&levels_by_date, render_start, render_end);

        let session_count = count_sessions(activities, year_start, end_date);
        debug!(
            records = activities.len(),
            active_days = minutes_by_date.len(),
            session_count,
            %year_start,
            %end_date,
            "aggregated activity"
        );

        let render = |theme: GraphTheme| {
            let mut options = RenderOptions::new(&filled_levels)
                .minutes(&filled_minutes)
                .session_count(session_count)
                .end_date(end_date)
                .theme(theme);
            options.title = self.title.clone();
            options.palette = self.palette.clone();
            render_contribution_graph(&options)
        };
        let dark_svg = render(GraphTheme::Dark);
        let light_svg = render(GraphTheme::Light);

        info!(
            %end_date,
            dark_bytes = dark_svg.len(),
            light_bytes = light_svg.len(),
            "rendered contribution graphs"
        );

        GraphArtifacts {
            end_date,
            minutes_by_date: filled_minutes,
            levels_by_date,
            session_count,
            dark_svg,
            light_svg,
        }
    }
}

/// Usable records whose date falls inside `start..=end`
fn count_sessions(activities: &[ActivityRecord], start: NaiveDate, end: NaiveDate) -> u64 {
    activities
        .iter()
        .filter_map(|record| record.usable())
        .filter_map(|(key, _)| parse_iso_date(key).ok())
        .filter(|date| (start..=end).contains(date))
        .count() as u64
}
