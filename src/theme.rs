//! Graph themes and palettes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;
use crate::types::IntensityLevel;

/// Default dark-mode cell palette, level 0 first
pub const RED_PALETTE: [&str; 5] = ["#161b22", "#3d0f0f", "#6b1a1a", "#a12c2c", "#d64545"];

/// Default light-mode cell palette, level 0 first
pub const LIGHT_RED_PALETTE: [&str; 5] = ["#ebedf0", "#ffebe9", "#ffcecb", "#ffaba8", "#cf222e"];

/// Which page background the graph is meant to sit on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphTheme {
    #[default]
    Dark,
    Light,
}

impl GraphTheme {
    pub const ALL: [GraphTheme; 2] = [GraphTheme::Dark, GraphTheme::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphTheme::Dark => "dark",
            GraphTheme::Light => "light",
        }
    }

    pub fn style(&self) -> ThemeStyle {
        match self {
            GraphTheme::Dark => ThemeStyle {
                summary_color: "#c9d1d9",
                axis_color: "#7d8590",
                muted_color: "#7d8590",
                card_border: "#30363d",
                palette: RED_PALETTE,
            },
            GraphTheme::Light => ThemeStyle {
                summary_color: "#24292f",
                axis_color: "#24292f",
                muted_color: "#57606a",
                card_border: "#d0d7de",
                palette: LIGHT_RED_PALETTE,
            },
        }
    }
}

impl fmt::Display for GraphTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphTheme {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(GraphTheme::Dark),
            "light" => Ok(GraphTheme::Light),
            _ => Err(GraphError::InvalidTheme(s.to_string())),
        }
    }
}

/// Text and chrome colors for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeStyle {
    pub summary_color: &'static str,
    pub axis_color: &'static str,
    pub muted_color: &'static str,
    pub card_border: &'static str,
    pub palette: [&'static str; 5],
}

/// Five cell colors indexed by intensity level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette(pub [String; 5]);

impl Palette {
    pub fn color(&self, level: IntensityLevel) -> &str {
        &self.0[level.index()]
    }
}

impl From<[&str; 5]> for Palette {
    fn from(colors: [&str; 5]) -> Self {
        Palette(colors.map(str::to_string))
    }
}

impl FromStr for Palette {
    type Err = GraphError;

    /// Parse five comma-separated `#rgb` or `#rrggbb` colors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let colors: Vec<String> = s.split(',').map(|c| c.trim().to_string()).collect();
        if colors.len() != 5 {
            return Err(GraphError::InvalidPalette(format!(
                "expected 5 colors, got {}",
                colors.len()
            )));
        }
        if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
            return Err(GraphError::InvalidPalette(format!("not a hex color: {bad:?}")));
        }

        let colors: [String; 5] = colors
            .try_into()
            .map_err(|_| GraphError::InvalidPalette(s.to_string()))?;
        Ok(Palette(colors))
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
