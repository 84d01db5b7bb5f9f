//! Core types for the git-big pipeline
//!
//! Activity records flow in, date-keyed minute totals and intensity levels
//! flow out. Date keys are `YYYY-MM-DD` strings held in ordered maps, so
//! iteration and serialization are always ascending by date.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Whole active minutes per calendar date.
pub type MinutesByDate = BTreeMap<String, u64>;

/// Intensity level per calendar date.
pub type LevelsByDate = BTreeMap<String, IntensityLevel>;

/// A single recorded activity.
///
/// Field names from upstream activity feeds (`moving_time`,
/// `start_date_local`) are accepted as aliases. Fields that are missing,
/// `null` or of the wrong JSON type read as `None`, so one malformed record
/// is skipped during aggregation instead of failing the whole input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Active duration in seconds
    #[serde(alias = "moving_time", default, deserialize_with = "lenient_number")]
    pub duration_seconds: Option<f64>,
    /// Local start timestamp; only the leading `YYYY-MM-DD` is used
    #[serde(alias = "start_date_local", default, deserialize_with = "lenient_string")]
    pub local_date: Option<String>,
}

impl ActivityRecord {
    pub fn new(local_date: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            duration_seconds: Some(duration_seconds),
            local_date: Some(local_date.into()),
        }
    }

    /// Read one record out of an arbitrary JSON value.
    ///
    /// Anything that is not an object becomes an empty record, which
    /// aggregation skips as [`SkipReason::MissingDate`].
    pub fn from_json_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Calendar date key, or `None` when the record has no usable date.
    pub fn date_key(&self) -> Option<&str> {
        let date = self.local_date.as_deref()?;
        if date.is_empty() {
            return None;
        }
        Some(date.get(..10).unwrap_or(date))
    }

    /// Why aggregation would skip this record, if it would.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.date_key().is_none() {
            return Some(SkipReason::MissingDate);
        }
        let Some(seconds) = self.duration_seconds else {
            return Some(SkipReason::MissingDuration);
        };
        if !seconds.is_finite() {
            return Some(SkipReason::NonFiniteDuration);
        }
        if seconds < 0.0 {
            return Some(SkipReason::NegativeDuration);
        }
        None
    }

    /// Date key and duration, for records aggregation keeps.
    pub fn usable(&self) -> Option<(&str, f64)> {
        if self.skip_reason().is_some() {
            return None;
        }
        Some((self.date_key()?, self.duration_seconds?))
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// Reason an activity record is dropped during aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingDate,
    MissingDuration,
    NonFiniteDuration,
    NegativeDuration,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingDate => "missing local date",
            SkipReason::MissingDuration => "missing duration",
            SkipReason::NonFiniteDuration => "non-finite duration",
            SkipReason::NegativeDuration => "negative duration",
        };
        f.write_str(text)
    }
}

/// Discrete activity intensity, always within `0..=4`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub struct IntensityLevel(u8);

impl IntensityLevel {
    pub const NONE: IntensityLevel = IntensityLevel(0);
    pub const MAX: IntensityLevel = IntensityLevel(4);

    /// Build a level, clamping anything above 4.
    pub fn new(level: u8) -> Self {
        IntensityLevel(level.min(Self::MAX.0))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl From<u8> for IntensityLevel {
    fn from(level: u8) -> Self {
        IntensityLevel::new(level)
    }
}

impl From<IntensityLevel> for u8 {
    fn from(level: IntensityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw minute count that may need sanitizing.
///
/// Negative, NaN and infinite values sanitize to 0; fractional values are
/// truncated toward zero.
pub trait MinuteValue: Copy {
    fn sanitized_minutes(self) -> u64;
}

impl MinuteValue for u64 {
    fn sanitized_minutes(self) -> u64 {
        self
    }
}

impl MinuteValue for u32 {
    fn sanitized_minutes(self) -> u64 {
        u64::from(self)
    }
}

impl MinuteValue for i64 {
    fn sanitized_minutes(self) -> u64 {
        u64::try_from(self).unwrap_or(0)
    }
}

impl MinuteValue for i32 {
    fn sanitized_minutes(self) -> u64 {
        u64::try_from(self).unwrap_or(0)
    }
}

impl MinuteValue for f64 {
    fn sanitized_minutes(self) -> u64 {
        if !self.is_finite() || self <= 0.0 {
            return 0;
        }
        self.floor() as u64
    }
}

/// A raw level value that may need clamping into `0..=4`.
pub trait LevelValue: Copy {
    fn clamped_level(self) -> IntensityLevel;
}

impl LevelValue for IntensityLevel {
    fn clamped_level(self) -> IntensityLevel {
        self
    }
}

impl LevelValue for u8 {
    fn clamped_level(self) -> IntensityLevel {
        IntensityLevel::new(self)
    }
}

impl LevelValue for u64 {
    fn clamped_level(self) -> IntensityLevel {
        IntensityLevel::new(self.min(4) as u8)
    }
}

impl LevelValue for i64 {
    fn clamped_level(self) -> IntensityLevel {
        IntensityLevel::new(self.clamp(0, 4) as u8)
    }
}

impl LevelValue for i32 {
    fn clamped_level(self) -> IntensityLevel {
        IntensityLevel::new(self.clamp(0, 4) as u8)
    }
}

impl LevelValue for f64 {
    fn clamped_level(self) -> IntensityLevel {
        if self.is_nan() || self < 0.0 {
            return IntensityLevel::NONE;
        }
        if self > 4.0 {
            return IntensityLevel::MAX;
        }
        IntensityLevel::new(self.floor() as u8)
    }
}
