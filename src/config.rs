//! Output configuration
//!
//! Settings come from `GITBIG_*` environment variables, then CLI flags
//! override individual fields. The legacy `FITHUB_END_DATE` variable is still
//! honored when `GITBIG_END_DATE` is unset.
//!
//! Only the `git-big*` file names are written; the legacy `fithub*.svg` and
//! `fithub-levels.json` copies are no longer produced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::GraphError;
use crate::pipeline::{parse_end_date, GraphProcessor};
use crate::theme::Palette;

pub const ENV_END_DATE: &str = "GITBIG_END_DATE";
pub const ENV_LEGACY_END_DATE: &str = "FITHUB_END_DATE";
pub const ENV_TITLE: &str = "GITBIG_TITLE";
pub const ENV_PALETTE: &str = "GITBIG_PALETTE";
pub const ENV_OUTPUT_DIR: &str = "GITBIG_OUTPUT_DIR";

/// Default directory for generated files
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Default file name stem for generated files
pub const DEFAULT_FILE_STEM: &str = "git-big";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Reference date (YYYY-MM-DD); today when unset
    pub end_date: Option<String>,
    pub title: Option<String>,
    /// Five comma-separated hex colors overriding both themes
    pub palette: Option<String>,
    pub output_dir: PathBuf,
    pub file_stem: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            end_date: None,
            title: None,
            palette: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_stem: DEFAULT_FILE_STEM.to_string(),
        }
    }
}

/// Where each generated file goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// Default graph (dark theme)
    pub svg: PathBuf,
    pub dark_svg: PathBuf,
    pub light_svg: PathBuf,
    pub levels: PathBuf,
}

impl GraphConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            end_date: non_empty(ENV_END_DATE).or_else(|| non_empty(ENV_LEGACY_END_DATE)),
            title: non_empty(ENV_TITLE),
            palette: non_empty(ENV_PALETTE),
            output_dir: non_empty(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            file_stem: defaults.file_stem,
        }
    }

    /// Validated reference date
    pub fn resolve_end_date(&self) -> Result<NaiveDate, GraphError> {
        parse_end_date(self.end_date.as_deref())
    }

    /// Processor carrying the configured title and palette
    pub fn processor(&self) -> Result<GraphProcessor, GraphError> {
        let mut processor = GraphProcessor::new();
        if let Some(title) = &self.title {
            processor = processor.with_title(title.clone());
        }
        if let Some(palette) = &self.palette {
            processor = processor.with_palette(palette.parse::<Palette>()?);
        }
        Ok(processor)
    }

    /// The four generated files under the output directory
    pub fn output_paths(&self) -> OutputPaths {
        let path = |suffix: &str| self.output_dir.join(format!("{}{suffix}", self.file_stem));
        OutputPaths {
            svg: path(".svg"),
            dark_svg: path("-dark.svg"),
            light_svg: path("-light.svg"),
            levels: path("-levels.json"),
        }
    }
}
