use anyhow::{Context, Result};
use tracing::info;

use crate::cli::PrepYArgs;
use crate::config::NaiadConfig;

pub fn run(args: PrepYArgs) -> Result<()> {
    let config = NaiadConfig::load(&args.config)?;

    let obs_temp = config
        .io
        .obs_temp
        .as_deref()
        .context("config is missing io.obs_temp")?;
    let obs_flow = config
        .io
        .obs_flow
        .as_deref()
        .context("config is missing io.obs_flow")?;
    let sim = config
        .io
        .simulation
        .as_deref()
        .context("config is missing io.simulation")?;
    let x_bundle = config
        .io
        .x_bundle
        .as_deref()
        .context("config is missing io.x_bundle (run prep-x first)")?;
    let out = args
        .out
        .or(config.io.y_bundle)
        .context("no Y bundle directory: set io.y_bundle or pass --out")?;
    let exclude = args.exclude.or(config.io.exclude);

    let bundle = naiad_prep::prep_y(
        obs_temp,
        obs_flow,
        sim,
        x_bundle,
        &config.variables.pretrain,
        &config.variables.finetune,
        exclude.as_deref(),
        Some(&out),
    )?;

    info!(
        out = %out.display(),
        n_segs = bundle.seg_ids.len(),
        n_trn = bundle.dates_trn.len(),
        n_tst = bundle.dates_tst.len(),
        "prep-y complete"
    );
    Ok(())
}
