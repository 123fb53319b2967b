//! Driver (feature) preparation.

use std::path::Path;

use chrono::NaiveDate;
use naiad_io::{read_simulation, write_x_bundle, IoError, XBundle};
use tracing::info;

use crate::error::PrepError;
use crate::split::split_dates;
use crate::standardize::{stack_standardized, train_statistics};

/// Prepares standardized driver arrays from the simulation source.
///
/// Loads `x_vars`, partitions the date axis at `test_start` (with a test
/// window of `n_test_years` calendar years), standardizes both
/// partitions with train-only statistics, and stacks the variables in
/// `x_vars` order into `(n_segs, n_dates, n_vars)` arrays. The returned
/// bundle fixes the axes every later [`prep_y`](crate::prep_y) call
/// aligns to; it is also persisted to `out_dir` when given.
///
/// # Errors
///
/// Returns [`PrepError::Config`] if `x_vars` is empty, a variable is
/// absent from the source, or the split is invalid; [`PrepError::Io`] on
/// file problems; [`PrepError::MissingValue`] if the simulation has a
/// hole in a requested driver.
pub fn prep_x(
    sim_path: &Path,
    x_vars: &[String],
    test_start: NaiveDate,
    n_test_years: u32,
    out_dir: Option<&Path>,
) -> Result<XBundle, PrepError> {
    if x_vars.is_empty() {
        return Err(PrepError::Config {
            reason: "no driver variables requested".to_string(),
        });
    }

    let sim = read_simulation(sim_path, x_vars).map_err(missing_var_to_config)?;
    let split = split_dates(sim.axes().dates(), test_start, n_test_years)?;
    let stats = train_statistics(&sim, x_vars, &split.trn)?;

    let x_trn = stack_standardized(&sim, x_vars, &split.trn, &stats)?;
    let x_tst = stack_standardized(&sim, x_vars, &split.tst, &stats)?;

    let bundle = XBundle {
        x_trn,
        x_tst,
        dates_trn: sim.axes().dates()[split.trn.clone()].to_vec(),
        dates_tst: sim.axes().dates()[split.tst.clone()].to_vec(),
        seg_ids: sim.axes().seg_ids().to_vec(),
        x_vars: x_vars.to_vec(),
        x_mean: stats.mean,
        x_std: stats.std,
    };

    info!(
        n_segs = bundle.seg_ids.len(),
        n_trn = bundle.dates_trn.len(),
        n_tst = bundle.dates_tst.len(),
        n_vars = bundle.x_vars.len(),
        "prepared driver arrays"
    );

    if let Some(dir) = out_dir {
        write_x_bundle(dir, &bundle)?;
    }
    Ok(bundle)
}

/// A variable the caller asked for but the source lacks is a caller
/// configuration problem, not an I/O failure.
pub(crate) fn missing_var_to_config(e: IoError) -> PrepError {
    match e {
        IoError::MissingVariable { name, path } => PrepError::Config {
            reason: format!(
                "variable '{name}' not in simulation source {}",
                path.display()
            ),
        },
        other => PrepError::Io(other),
    }
}
