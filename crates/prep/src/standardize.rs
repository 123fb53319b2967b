//! Reversible per-variable standardization.

use std::ops::Range;

use ndarray::Array3;
use naiad_grid::Dataset;

use crate::error::PrepError;
use crate::masks::MaskedTargets;

/// Per-variable mean and standard deviation, in caller-supplied variable
/// order.
///
/// The standard deviations are guaranteed usable as divisors: a
/// degenerate (zero or non-finite) deviation is replaced by 1.0, which
/// keeps `(x - mean) / std` exactly invertible.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardization {
    /// Per-variable mean.
    pub mean: Vec<f64>,
    /// Per-variable standard deviation.
    pub std: Vec<f64>,
}

/// Computes per-variable statistics over the training date range.
///
/// Only present cells participate; test-partition values never enter the
/// statistics (leak-free invariant).
///
/// # Errors
///
/// Returns [`PrepError::Grid`] if a requested variable is absent.
pub fn train_statistics(
    dataset: &Dataset,
    variables: &[String],
    trn: &Range<usize>,
) -> Result<Standardization, PrepError> {
    let mut mean = Vec::with_capacity(variables.len());
    let mut std = Vec::with_capacity(variables.len());

    for name in variables {
        let cells = dataset.var(name)?;
        let present: Vec<f64> = cells
            .slice(ndarray::s![.., trn.clone()])
            .iter()
            .filter_map(|cell| *cell)
            .collect();

        mean.push(naiad_stats::mean(&present));
        std.push(guard_std(naiad_stats::std_pop(&present)));
    }

    Ok(Standardization { mean, std })
}

/// Computes weighted per-variable statistics over the training range.
///
/// Each cell contributes with its weight; zero-weight cells (imputed
/// filler, excluded observations) do not participate at all. A variable
/// with zero total train weight gets mean 0.0 and std 1.0.
///
/// # Errors
///
/// Returns [`PrepError::Config`] if a variable has no weight grid,
/// [`PrepError::Grid`] if it is absent from the filled dataset, or
/// [`PrepError::MissingValue`] if the filled dataset has a hole (it is
/// guaranteed total by construction, so this indicates caller misuse).
pub fn weighted_train_statistics(
    targets: &MaskedTargets,
    variables: &[String],
    trn: &Range<usize>,
) -> Result<Standardization, PrepError> {
    let mut mean = Vec::with_capacity(variables.len());
    let mut std = Vec::with_capacity(variables.len());

    for name in variables {
        let cells = targets.filled().var(name)?;
        let weights = targets.weights(name)?;

        let mut values = Vec::new();
        let mut cell_weights = Vec::new();
        for (i, j, value) in iter_range(cells, targets, name, trn)? {
            values.push(value);
            cell_weights.push(weights[(i, j)]);
        }

        mean.push(naiad_stats::weighted_mean(&values, &cell_weights));
        std.push(guard_std(naiad_stats::weighted_std_pop(
            &values,
            &cell_weights,
        )));
    }

    Ok(Standardization { mean, std })
}

/// Stacks the named variables over a date range into a standardized
/// `(n_segs, n_dates, n_vars)` array.
///
/// # Errors
///
/// Returns [`PrepError::Grid`] if a variable is absent, or
/// [`PrepError::MissingValue`] on an empty cell — stacked arrays must be
/// total.
pub fn stack_standardized(
    dataset: &Dataset,
    variables: &[String],
    range: &Range<usize>,
    stats: &Standardization,
) -> Result<Array3<f64>, PrepError> {
    let n_segs = dataset.axes().n_segs();
    let mut stacked = Array3::zeros((n_segs, range.len(), variables.len()));

    for (k, name) in variables.iter().enumerate() {
        let cells = dataset.var(name)?;
        for i in 0..n_segs {
            for (jj, j) in range.clone().enumerate() {
                let value = cells[(i, j)].ok_or_else(|| PrepError::MissingValue {
                    variable: name.clone(),
                    seg_id: dataset.axes().seg_ids()[i],
                    date: dataset.axes().dates()[j],
                })?;
                stacked[(i, jj, k)] = (value - stats.mean[k]) / stats.std[k];
            }
        }
    }

    Ok(stacked)
}

/// Stacks the named weight grids over a date range into an
/// `(n_segs, n_dates, n_vars)` array.
///
/// # Errors
///
/// Returns [`PrepError::Config`] if a variable has no weight grid.
pub fn stack_weights(
    targets: &MaskedTargets,
    variables: &[String],
    range: &Range<usize>,
) -> Result<Array3<f64>, PrepError> {
    let n_segs = targets.axes().n_segs();
    let mut stacked = Array3::zeros((n_segs, range.len(), variables.len()));

    for (k, name) in variables.iter().enumerate() {
        let weights = targets.weights(name)?;
        for i in 0..n_segs {
            for (jj, j) in range.clone().enumerate() {
                stacked[(i, jj, k)] = weights[(i, j)];
            }
        }
    }

    Ok(stacked)
}

/// Inverts [`stack_standardized`]'s transform for one value.
pub fn unstandardize(value: f64, mean: f64, std: f64) -> f64 {
    value * std + mean
}

/// Replaces a degenerate standard deviation with 1.0.
fn guard_std(std: f64) -> f64 {
    if std.is_finite() && std > 0.0 {
        std
    } else {
        1.0
    }
}

fn iter_range(
    cells: &ndarray::Array2<Option<f64>>,
    targets: &MaskedTargets,
    name: &str,
    range: &Range<usize>,
) -> Result<Vec<(usize, usize, f64)>, PrepError> {
    let mut out = Vec::with_capacity(targets.axes().n_segs() * range.len());
    for i in 0..targets.axes().n_segs() {
        for j in range.clone() {
            let value = cells[(i, j)].ok_or_else(|| PrepError::MissingValue {
                variable: name.to_string(),
                seg_id: targets.axes().seg_ids()[i],
                date: targets.axes().dates()[j],
            })?;
            out.push((i, j, value));
        }
    }
    Ok(out)
}
