use anyhow::{Context, Result};
use tracing::info;

use crate::cli::PrepXArgs;
use crate::config::NaiadConfig;

pub fn run(args: PrepXArgs) -> Result<()> {
    let config = NaiadConfig::load(&args.config)?;

    let sim = config
        .io
        .simulation
        .as_deref()
        .context("config is missing io.simulation")?;
    let out = args
        .out
        .or(config.io.x_bundle)
        .context("no X bundle directory: set io.x_bundle or pass --out")?;

    let bundle = naiad_prep::prep_x(
        sim,
        &config.variables.x_vars,
        config.split.test_start_date,
        config.split.n_test_years,
        Some(&out),
    )?;

    info!(
        out = %out.display(),
        n_segs = bundle.seg_ids.len(),
        n_trn = bundle.dates_trn.len(),
        n_tst = bundle.dates_tst.len(),
        "prep-x complete"
    );
    Ok(())
}
