//! Weight and fill construction for fine-tuning targets.

use std::collections::BTreeMap;

use ndarray::Array2;
use naiad_grid::{Axes, Dataset};
use tracing::debug;

use crate::error::PrepError;

/// Per-variable weights and gap-filled values over one set of axes.
///
/// The weight grids are binary: 1.0 where a genuine fine-tuning
/// observation exists, 0.0 where the value was imputed from the
/// pretraining source (or excluded later). The filled dataset is total:
/// every cell of every variable holds a value.
#[derive(Debug, Clone)]
pub struct MaskedTargets {
    pub(crate) weights: BTreeMap<String, Array2<f64>>,
    pub(crate) filled: Dataset,
}

impl MaskedTargets {
    /// Returns the shared axes.
    pub fn axes(&self) -> &Axes {
        self.filled.axes()
    }

    /// Returns the gap-filled dataset.
    pub fn filled(&self) -> &Dataset {
        &self.filled
    }

    /// Returns a variable's weight grid.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::Config`] if no weight grid exists for the
    /// name.
    pub fn weights(&self, name: &str) -> Result<&Array2<f64>, PrepError> {
        self.weights.get(name).ok_or_else(|| PrepError::Config {
            reason: format!("no weight grid for variable '{name}'"),
        })
    }

    /// Iterates over `(name, weights)` pairs in sorted name order.
    pub fn iter_weights(&self) -> impl Iterator<Item = (&str, &Array2<f64>)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Combines a dense pretraining dataset with a sparse fine-tuning dataset
/// into per-variable weights and gap-filled values.
///
/// For every pretraining variable:
///
/// - If the fine-tuning dataset carries the variable, each present cell
///   keeps its observed value with weight 1.0; each missing cell takes
///   the pretraining value with weight 0.0.
/// - If not, the variable was never measured: the weight grid is all
///   zeros and the filled grid equals the pretraining grid. Pretraining
///   can therefore use more variables than fine-tuning ever sees.
///
/// Pure function; neither input is modified.
///
/// # Errors
///
/// Returns [`PrepError::ShapeMismatch`] if the datasets have different
/// axes, [`PrepError::Config`] if a fine-tuning variable has no
/// pretraining counterpart (there would be nothing to impute from), or
/// [`PrepError::MissingValue`] if a pretraining cell needed as fill is
/// itself missing.
pub fn build_weights_and_fill(
    pretrain: &Dataset,
    finetune: &Dataset,
) -> Result<MaskedTargets, PrepError> {
    if pretrain.axes() != finetune.axes() {
        return Err(PrepError::ShapeMismatch {
            reason: "pretraining and fine-tuning datasets have different axes".to_string(),
        });
    }

    for name in finetune.var_names() {
        if !pretrain.contains_var(name) {
            return Err(PrepError::Config {
                reason: format!("fine-tuning variable '{name}' has no pretraining counterpart"),
            });
        }
    }

    let axes = pretrain.axes();
    let mut weights = BTreeMap::new();
    let mut filled = Dataset::new(axes.clone());

    for (name, pre_cells) in pretrain.iter() {
        let ft_cells = if finetune.contains_var(name) {
            Some(finetune.var(name)?)
        } else {
            None
        };

        let mut var_weights = Array2::zeros(axes.shape());
        let mut var_filled = Array2::from_elem(axes.shape(), None);

        for ((i, j), &pre_cell) in pre_cells.indexed_iter() {
            let observed = ft_cells.and_then(|cells| cells[(i, j)]);
            let cell = match observed {
                Some(value) => {
                    var_weights[(i, j)] = 1.0;
                    value
                }
                None => pre_cell.ok_or_else(|| PrepError::MissingValue {
                    variable: name.to_string(),
                    seg_id: axes.seg_ids()[i],
                    date: axes.dates()[j],
                })?,
            };
            var_filled[(i, j)] = Some(cell);
        }

        let n_observed = var_weights.sum() as usize;
        debug!(variable = name, n_observed, "built weight grid");

        weights.insert(name.to_string(), var_weights);
        filled.insert(name.to_string(), var_filled)?;
    }

    Ok(MaskedTargets { weights, filled })
}
