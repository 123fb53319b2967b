//! Error types for naiad-io.

use std::path::PathBuf;

use naiad_grid::GridError;

/// Error type for all fallible operations in the naiad-io crate.
///
/// Covers missing files, malformed CSV/Parquet/YAML inputs, and
/// prepared-bundle persistence failures. A malformed exclusion file is
/// the pipeline's parse error: it is surfaced immediately and never
/// recovered from.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps a CSV read or parse failure.
    #[error("csv error in {}: {reason}", path.display())]
    Csv {
        /// Path to the offending file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when a required CSV column is absent.
    #[error("column '{column}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        column: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Wraps an error originating from the Parquet/Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a requested variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when an exclusion-rule file cannot be parsed.
    #[error("malformed exclusion file {}: {reason}", path.display())]
    Exclude {
        /// Path to the offending file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when a prepared bundle cannot be written or read back.
    #[error("bundle error at {}: {reason}", path.display())]
    Bundle {
        /// Bundle directory or file involved.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Grid construction error while assembling file contents.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}
