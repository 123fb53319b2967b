//! Sparse observation tables (CSV).

use std::path::Path;

use chrono::NaiveDate;
use ndarray::Array2;
use naiad_grid::Axes;
use tracing::debug;

use crate::error::IoError;

/// One observed value at a `(segment, date)` cell.
///
/// Observation files carry one row per measurement; combinations with no
/// measurement are simply absent from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsRecord {
    /// Segment id (`seg_id_nat` column).
    pub seg_id: i64,
    /// Observation date (`date` column).
    pub date: NaiveDate,
    /// Observed value.
    pub value: f64,
}

/// Reads a sparse observation CSV.
///
/// The file must carry `seg_id_nat` and `date` columns plus the named
/// value column (`discharge_cms` for flow, `temp_c` for temperature).
/// Rows with an empty value field are treated as absent observations and
/// skipped; a non-numeric value is an error.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::MissingColumn`] if a required column is absent, or
/// [`IoError::Csv`] on read or parse failures.
pub fn read_observations(path: &Path, value_column: &str) -> Result<Vec<ObsRecord>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let csv_err = |reason: String| IoError::Csv {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_err(e.to_string()))?;
    let headers = reader.headers().map_err(|e| csv_err(e.to_string()))?.clone();

    let column_pos = |name: &str| -> Result<usize, IoError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IoError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    };
    let seg_pos = column_pos("seg_id_nat")?;
    let date_pos = column_pos("date")?;
    let value_pos = column_pos(value_column)?;

    let mut records = Vec::new();
    let mut n_empty = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_err(e.to_string()))?;
        let line = row + 2; // header is line 1

        let field = |pos: usize| record.get(pos).unwrap_or("");

        let raw_value = field(value_pos).trim();
        if raw_value.is_empty() {
            n_empty += 1;
            continue;
        }

        let seg_id: i64 = field(seg_pos)
            .trim()
            .parse()
            .map_err(|e| csv_err(format!("line {line}: bad seg_id_nat: {e}")))?;
        let date = field(date_pos)
            .trim()
            .parse::<NaiveDate>()
            .map_err(|e| csv_err(format!("line {line}: bad date: {e}")))?;
        let value: f64 = raw_value
            .parse()
            .map_err(|e| csv_err(format!("line {line}: bad {value_column}: {e}")))?;

        records.push(ObsRecord { seg_id, date, value });
    }

    debug!(
        n_records = records.len(),
        n_empty,
        column = value_column,
        path = %path.display(),
        "read observations"
    );
    Ok(records)
}

/// Scatters observation records onto a grid over the given axes.
///
/// Cells with no record stay `None`. Records whose segment or date is not
/// on the axes are dropped (observation files legitimately span more
/// dates than any one prepared bundle); the drop count is logged at debug
/// level. NaN values count as missing, per the sentinel convention.
pub fn observations_to_grid(records: &[ObsRecord], axes: &Axes) -> Array2<Option<f64>> {
    let mut grid = Array2::from_elem(axes.shape(), None);
    let mut n_dropped = 0usize;

    for rec in records {
        match (axes.seg_pos(rec.seg_id), axes.date_pos(rec.date)) {
            (Some(i), Some(j)) if !rec.value.is_nan() => {
                grid[(i, j)] = Some(rec.value);
            }
            _ => n_dropped += 1,
        }
    }

    if n_dropped > 0 {
        debug!(n_dropped, "dropped observations outside the target axes");
    }
    grid
}
