//! Long-format Parquet simulation source.

use std::collections::BTreeSet;
use std::path::Path;

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::NaiveDate;
use ndarray::Array2;
use naiad_grid::{Axes, Dataset};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::info;

use crate::error::IoError;

/// Segment-id column of the simulation store.
const SEG_COLUMN: &str = "seg_id_nat";

/// Date column of the simulation store.
const DATE_COLUMN: &str = "date";

/// Reads the named variables from a simulation Parquet file.
///
/// The file is a long table: one row per `(segment, date)` with an
/// `Int64` `seg_id_nat` column, a `Date32` `date` column, and one
/// `Float64` column per variable. The result is a [`Dataset`] whose axes
/// are the distinct segments and dates of the file, both sorted
/// ascending. Null and NaN cells become `None`; so does any
/// `(segment, date)` combination with no row.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::MissingVariable`] if a requested variable has no column,
/// or [`IoError::Parquet`] on format and type problems.
pub fn read_simulation(path: &Path, variables: &[String]) -> Result<Dataset, IoError> {
    let batches = read_batches(path)?;
    if batches.is_empty() {
        return Err(IoError::Parquet {
            reason: format!("simulation source {} contains no rows", path.display()),
        });
    }

    validate_schema(&batches[0], variables, path)?;

    // First pass: axis labels.
    let mut seg_set = BTreeSet::new();
    let mut date_set = BTreeSet::new();
    for batch in &batches {
        let (segs, dates) = key_columns(batch)?;
        for row in 0..batch.num_rows() {
            seg_set.insert(segs.value(row));
            date_set.insert(date_value(dates, row, path)?);
        }
    }

    let axes = Axes::new(
        seg_set.into_iter().collect(),
        date_set.into_iter().collect(),
    )?;

    // Second pass: scatter each variable onto the axes.
    let mut dataset = Dataset::new(axes);
    for name in variables {
        let mut cells: Array2<Option<f64>> = Array2::from_elem(dataset.axes().shape(), None);

        for batch in &batches {
            let (segs, dates) = key_columns(batch)?;
            let values = batch
                .column_by_name(name)
                .ok_or_else(|| IoError::MissingVariable {
                    name: name.clone(),
                    path: path.to_path_buf(),
                })?
                .as_primitive::<Float64Type>();

            for row in 0..batch.num_rows() {
                let i = dataset
                    .axes()
                    .seg_pos(segs.value(row))
                    .expect("segment collected in first pass");
                let j = dataset
                    .axes()
                    .date_pos(date_value(dates, row, path)?)
                    .expect("date collected in first pass");

                if values.is_null(row) || values.value(row).is_nan() {
                    continue;
                }
                cells[(i, j)] = Some(values.value(row));
            }
        }

        dataset.insert(name.clone(), cells)?;
    }

    info!(
        n_segs = dataset.axes().n_segs(),
        n_dates = dataset.axes().n_dates(),
        n_vars = dataset.n_vars(),
        path = %path.display(),
        "read simulation source"
    );
    Ok(dataset)
}

/// Reads all record batches from a Parquet file.
fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| IoError::Parquet {
            reason: e.to_string(),
        })
}

/// Checks key-column and variable-column names and types, accumulating
/// every mismatch into one error.
fn validate_schema(
    batch: &RecordBatch,
    variables: &[String],
    path: &Path,
) -> Result<(), IoError> {
    let schema = batch.schema();
    let mut mismatches: Vec<String> = Vec::new();

    for (name, expected) in [
        (SEG_COLUMN, DataType::Int64),
        (DATE_COLUMN, DataType::Date32),
    ] {
        match schema.column_with_name(name) {
            Some((_, field)) if *field.data_type() == expected => {}
            Some((_, field)) => mismatches.push(format!(
                "column '{name}': expected {expected}, got {}",
                field.data_type()
            )),
            None => mismatches.push(format!("column '{name}' missing")),
        }
    }

    for name in variables {
        match schema.column_with_name(name) {
            Some((_, field)) if *field.data_type() == DataType::Float64 => {}
            Some((_, field)) => mismatches.push(format!(
                "column '{name}': expected Float64, got {}",
                field.data_type()
            )),
            None => {
                return Err(IoError::MissingVariable {
                    name: name.clone(),
                    path: path.to_path_buf(),
                });
            }
        }
    }

    if !mismatches.is_empty() {
        return Err(IoError::Parquet {
            reason: format!("{}: {}", path.display(), mismatches.join("; ")),
        });
    }
    Ok(())
}

/// Extracts the typed key columns of a batch.
fn key_columns(
    batch: &RecordBatch,
) -> Result<
    (
        &arrow::array::Int64Array,
        &arrow::array::Date32Array,
    ),
    IoError,
> {
    let segs = batch
        .column_by_name(SEG_COLUMN)
        .ok_or_else(|| IoError::Parquet {
            reason: format!("column '{SEG_COLUMN}' missing"),
        })?
        .as_primitive::<Int64Type>();
    let dates = batch
        .column_by_name(DATE_COLUMN)
        .ok_or_else(|| IoError::Parquet {
            reason: format!("column '{DATE_COLUMN}' missing"),
        })?
        .as_primitive::<Date32Type>();
    Ok((segs, dates))
}

/// Converts one Date32 cell to a calendar date.
fn date_value(
    dates: &arrow::array::Date32Array,
    row: usize,
    path: &Path,
) -> Result<NaiveDate, IoError> {
    dates.value_as_date(row).ok_or_else(|| IoError::Parquet {
        reason: format!(
            "{}: row {row}: date out of representable range",
            path.display()
        ),
    })
}
