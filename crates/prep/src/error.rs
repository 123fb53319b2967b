//! Error types for the naiad-prep crate.

use chrono::NaiveDate;
use naiad_grid::GridError;
use naiad_io::IoError;

/// Error type for all fallible operations in the naiad-prep crate.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// Returned when caller configuration is wrong: an unknown variable,
    /// a split date outside the data range, an empty partition, or a bad
    /// fine-tune variable list.
    #[error("invalid configuration: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when two inputs that must share axes do not.
    #[error("shape mismatch: {reason}")]
    ShapeMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Returned when a cell that must be populated is missing.
    #[error("no value for variable '{variable}' at segment {seg_id}, {date}")]
    MissingValue {
        /// Variable holding the empty cell.
        variable: String,
        /// Segment id of the empty cell.
        seg_id: i64,
        /// Date of the empty cell.
        date: NaiveDate,
    },

    /// File-format error from naiad-io.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Grid construction error.
    #[error(transparent)]
    Grid(#[from] GridError),
}
