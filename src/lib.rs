//! git-big - Workout activity rendered as a contribution calendar
//!
//! git-big turns activity records (a duration plus a local start date) into a
//! GitHub-style contribution graph through a deterministic pipeline:
//! aggregation → boundary derivation → level bucketing → grid layout → SVG.
//!
//! ## Modules
//!
//! - **Normalization**: minutes per day and intensity levels `0..=4`
//! - **Layout**: Sunday-to-Saturday week columns with month labels
//! - **Rendering**: standalone SVG cards in dark and light themes

pub mod boundaries;
pub mod calendar;
pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod normalizer;
pub mod pipeline;
pub mod render;
pub mod theme;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use boundaries::{derive_intensity_boundaries, Boundaries};
pub use config::GraphConfig;
pub use error::GraphError;
pub use grid::{build_contribution_grid, build_month_labels, ContributionCell, MonthLabel};
pub use input::ActivityInput;
pub use normalizer::{aggregate_minutes_by_date, bucket_minutes, normalize_minutes_by_date};
pub use pipeline::{activities_to_graph, parse_end_date, GraphArtifacts, GraphProcessor};
pub use render::{render_contribution_graph, RenderOptions};
pub use theme::{GraphTheme, Palette};
pub use types::{ActivityRecord, IntensityLevel, LevelsByDate, MinutesByDate};

/// Library version
pub const GITBIG_VERSION: &str = env!("CARGO_PKG_VERSION");
