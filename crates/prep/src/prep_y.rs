//! Target preparation: observations merged with simulated targets.

use std::path::Path;

use ndarray::Array2;
use naiad_grid::{Axes, Dataset};
use naiad_io::{
    observations_to_grid, read_exclude_file, read_observations, read_simulation, read_x_bundle,
    write_y_bundle, YBundle,
};
use tracing::info;

use crate::error::PrepError;
use crate::exclude::apply_exclude_rules;
use crate::masks::build_weights_and_fill;
use crate::prep_x::missing_var_to_config;
use crate::standardize::{
    stack_standardized, stack_weights, train_statistics, weighted_train_statistics,
};

/// Value column of the temperature observation file.
const TEMP_COLUMN: &str = "temp_c";

/// Value column of the flow observation file.
const FLOW_COLUMN: &str = "discharge_cms";

/// Prepares standardized, weighted target arrays aligned to an X bundle.
///
/// Observed temperature (`ft_vars[0]`) and flow (`ft_vars[1]`) are
/// scattered onto the axes the X bundle established, merged with the
/// simulated `pt_vars` via [`build_weights_and_fill`], optionally
/// filtered through an exclusion file, then split at the X bundle's
/// train/test boundary. Fine-tuning values are standardized with
/// weighted train statistics (imputed filler never enters them); the
/// simulated targets are additionally standardized with their own train
/// statistics and returned as pretraining arrays.
///
/// Positional alignment is the contract: cell *i* of any X array and
/// cell *i* of any Y array refer to the same segment and date.
///
/// # Errors
///
/// Returns [`PrepError::Config`] on a bad variable configuration,
/// [`PrepError::ShapeMismatch`] if the simulation source cannot supply
/// the X bundle's axes, or [`PrepError::Io`] on file problems (including
/// a malformed exclusion file).
#[allow(clippy::too_many_arguments)]
pub fn prep_y(
    obs_temp_path: &Path,
    obs_flow_path: &Path,
    sim_path: &Path,
    x_bundle_dir: &Path,
    pt_vars: &[String],
    ft_vars: &[String],
    exclude_file: Option<&Path>,
    out_dir: Option<&Path>,
) -> Result<YBundle, PrepError> {
    check_variables(pt_vars, ft_vars)?;

    let x = read_x_bundle(x_bundle_dir)?;
    let mut y_dates = x.dates_trn.clone();
    y_dates.extend_from_slice(&x.dates_tst);
    let axes = Axes::new(x.seg_ids.clone(), y_dates)?;

    let sim = read_simulation(sim_path, pt_vars).map_err(missing_var_to_config)?;
    let pretrain = align_to_axes(&sim, &axes, sim_path)?;

    let mut finetune = Dataset::new(axes.clone());
    let temp_records = read_observations(obs_temp_path, TEMP_COLUMN)?;
    finetune.insert(ft_vars[0].clone(), observations_to_grid(&temp_records, &axes))?;
    let flow_records = read_observations(obs_flow_path, FLOW_COLUMN)?;
    finetune.insert(ft_vars[1].clone(), observations_to_grid(&flow_records, &axes))?;

    let mut targets = build_weights_and_fill(&pretrain, &finetune)?;

    if let Some(path) = exclude_file {
        let rules = read_exclude_file(path)?;
        let n_zeroed = apply_exclude_rules(&mut targets, &rules);
        info!(n_rules = rules.len(), n_zeroed, "applied exclusion rules");
    }

    let trn = 0..x.dates_trn.len();
    let tst = x.dates_trn.len()..axes.n_dates();

    let obs_stats = weighted_train_statistics(&targets, ft_vars, &trn)?;
    let y_obs_trn = stack_standardized(targets.filled(), ft_vars, &trn, &obs_stats)?;
    let y_obs_tst = stack_standardized(targets.filled(), ft_vars, &tst, &obs_stats)?;
    let y_wgts_trn = stack_weights(&targets, ft_vars, &trn)?;
    let y_wgts_tst = stack_weights(&targets, ft_vars, &tst)?;

    let pre_stats = train_statistics(&pretrain, pt_vars, &trn)?;
    let y_pre_trn = stack_standardized(&pretrain, pt_vars, &trn, &pre_stats)?;
    let y_pre_tst = stack_standardized(&pretrain, pt_vars, &tst, &pre_stats)?;

    let bundle = YBundle {
        y_obs_trn,
        y_obs_tst,
        y_wgts_trn,
        y_wgts_tst,
        y_pre_trn,
        y_pre_tst,
        dates_trn: x.dates_trn,
        dates_tst: x.dates_tst,
        seg_ids: x.seg_ids,
        y_vars_ft: ft_vars.to_vec(),
        y_vars_pt: pt_vars.to_vec(),
        y_obs_mean: obs_stats.mean,
        y_obs_std: obs_stats.std,
        y_pre_mean: pre_stats.mean,
        y_pre_std: pre_stats.std,
    };

    info!(
        n_segs = bundle.seg_ids.len(),
        n_trn = bundle.dates_trn.len(),
        n_tst = bundle.dates_tst.len(),
        n_ft_vars = bundle.y_vars_ft.len(),
        n_pt_vars = bundle.y_vars_pt.len(),
        "prepared target arrays"
    );

    if let Some(dir) = out_dir {
        write_y_bundle(dir, &bundle)?;
    }
    Ok(bundle)
}

/// Validates the pretrain/fine-tune variable lists.
fn check_variables(pt_vars: &[String], ft_vars: &[String]) -> Result<(), PrepError> {
    if pt_vars.is_empty() {
        return Err(PrepError::Config {
            reason: "no pretraining variables requested".to_string(),
        });
    }
    if ft_vars.len() != 2 {
        return Err(PrepError::Config {
            reason: format!(
                "expected exactly two fine-tuning variables (temperature, flow), got {}",
                ft_vars.len()
            ),
        });
    }
    for name in ft_vars {
        if !pt_vars.contains(name) {
            return Err(PrepError::Config {
                reason: format!("fine-tuning variable '{name}' is not a pretraining variable"),
            });
        }
    }
    Ok(())
}

/// Re-indexes a simulation dataset onto the axes the X bundle fixed.
///
/// The simulation must cover exactly the bundle's segments and every one
/// of its dates; anything else means X and Y would silently refer to
/// different cells, so it fails instead.
fn align_to_axes(sim: &Dataset, axes: &Axes, sim_path: &Path) -> Result<Dataset, PrepError> {
    if sim.axes().n_segs() != axes.n_segs() {
        return Err(PrepError::ShapeMismatch {
            reason: format!(
                "simulation source {} has {} segments, X bundle has {}",
                sim_path.display(),
                sim.axes().n_segs(),
                axes.n_segs()
            ),
        });
    }

    let seg_map: Vec<usize> = axes
        .seg_ids()
        .iter()
        .map(|&seg| {
            sim.axes().seg_pos(seg).ok_or_else(|| PrepError::ShapeMismatch {
                reason: format!(
                    "segment {seg} from the X bundle is missing from {}",
                    sim_path.display()
                ),
            })
        })
        .collect::<Result<_, _>>()?;

    let date_map: Vec<usize> = axes
        .dates()
        .iter()
        .map(|&date| {
            sim.axes().date_pos(date).ok_or_else(|| PrepError::ShapeMismatch {
                reason: format!(
                    "date {date} from the X bundle is missing from {}",
                    sim_path.display()
                ),
            })
        })
        .collect::<Result<_, _>>()?;

    let mut aligned = Dataset::new(axes.clone());
    for (name, cells) in sim.iter() {
        let mut out = Array2::from_elem(axes.shape(), None);
        for (i, &si) in seg_map.iter().enumerate() {
            for (j, &sj) in date_map.iter().enumerate() {
                out[(i, j)] = cells[(si, sj)];
            }
        }
        aligned.insert(name, out)?;
    }
    Ok(aligned)
}
