//! Declarative segment/date exclusion rules.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::error::IoError;

/// One exclusion rule: a set of segments, optionally bounded in time.
///
/// A rule matches a `(segment, date)` cell when the segment is listed and
/// the date falls within `[start_date, end_date]`; an absent bound is
/// unbounded on that side. Rules are kept in declaration order and
/// OR-combined by callers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeRule {
    /// Segment ids the rule applies to.
    pub seg_id_nats: Vec<i64>,
    /// First excluded date, inclusive.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last excluded date, inclusive.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl ExcludeRule {
    /// Returns `true` if the rule covers this `(segment, date)` cell.
    pub fn matches(&self, seg_id: i64, date: NaiveDate) -> bool {
        if !self.seg_id_nats.contains(&seg_id) {
            return false;
        }
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Reads an ordered list of exclusion rules from a YAML file.
///
/// The file is a sequence of mappings with key `seg_id_nats` and optional
/// `start_date` / `end_date` ISO dates. No validation happens beyond
/// structural parsing; rule order is preserved.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Exclude`] if it cannot be parsed.
pub fn read_exclude_file(path: &Path) -> Result<Vec<ExcludeRule>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| IoError::Exclude {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let rules: Vec<ExcludeRule> =
        serde_yaml::from_str(&contents).map_err(|e| IoError::Exclude {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    debug!(n_rules = rules.len(), path = %path.display(), "read exclusion rules");
    Ok(rules)
}
