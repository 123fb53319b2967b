//! Error types for the naiad-grid crate.

use chrono::NaiveDate;

/// Error type for all fallible operations in the naiad-grid crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when a segment id appears more than once in an axis.
    #[error("duplicate segment id {seg_id} in axis")]
    DuplicateSegment {
        /// The repeated segment id.
        seg_id: i64,
    },

    /// Returned when the date axis is not strictly ascending.
    #[error("date axis not strictly ascending at position {position}")]
    DatesNotAscending {
        /// Index of the first offending date.
        position: usize,
    },

    /// Returned when looking up a variable the dataset does not hold.
    #[error("unknown variable '{name}'")]
    UnknownVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// Returned when inserting a variable that already exists.
    #[error("variable '{name}' already present")]
    DuplicateVariable {
        /// Name of the repeated variable.
        name: String,
    },

    /// Returned when a segment id is not on the axis.
    #[error("segment {seg_id} not on axis")]
    UnknownSegment {
        /// The unknown segment id.
        seg_id: i64,
    },

    /// Returned when a date is not on the axis.
    #[error("date {date} not on axis")]
    UnknownDate {
        /// The unknown date.
        date: NaiveDate,
    },

    /// Returned when a variable's shape does not match the axes.
    #[error(
        "variable '{name}': expected {expected_segs} x {expected_dates}, got {got_segs} x {got_dates}"
    )]
    ShapeMismatch {
        /// Name of the offending variable.
        name: String,
        /// Expected number of segments.
        expected_segs: usize,
        /// Expected number of dates.
        expected_dates: usize,
        /// Actual number of segments.
        got_segs: usize,
        /// Actual number of dates.
        got_dates: usize,
    },
}
