//! Activity input parsing
//!
//! Activity records arrive either as a JSON array or as newline-delimited
//! JSON. Parsing is strict about JSON syntax only. Individual records with
//! missing or mistyped fields still parse and are skipped later by
//! aggregation; [`ActivityInput::validate`] reports what would be skipped.

use serde::Serialize;

use crate::error::GraphError;
use crate::types::{ActivityRecord, SkipReason};

/// Entry points for reading activity records
pub struct ActivityInput;

impl ActivityInput {
    /// Parse a JSON array of activity records
    pub fn parse_array(json: &str) -> Result<Vec<ActivityRecord>, GraphError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(values.into_iter().map(ActivityRecord::from_json_value).collect())
    }

    /// Parse NDJSON (one activity record per line, blank lines ignored)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ActivityRecord>, GraphError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value = serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
                GraphError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            records.push(ActivityRecord::from_json_value(value));
        }
        Ok(records)
    }

    /// Report which records aggregation would skip, and why
    pub fn validate(records: &[ActivityRecord]) -> ValidationReport {
        let issues: Vec<RecordIssue> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.skip_reason().map(|reason| RecordIssue {
                    index,
                    local_date: record.local_date.clone(),
                    reason,
                })
            })
            .collect();

        ValidationReport {
            total_records: records.len(),
            usable_records: records.len() - issues.len(),
            skipped_records: issues.len(),
            issues,
        }
    }
}

/// Summary of record usability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub total_records: usize,
    pub usable_records: usize,
    pub skipped_records: usize,
    pub issues: Vec<RecordIssue>,
}

/// A record that aggregation would drop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssue {
    pub index: usize,
    pub local_date: Option<String>,
    pub reason: SkipReason,
}
