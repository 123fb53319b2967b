//! Prepared-bundle persistence.
//!
//! A bundle is written as a directory holding one `.npy` file per array
//! plus a `metadata.json` carrying the axis labels, variable names, and
//! standardization statistics. Reading the directory back reconstructs
//! the exact bundle, so a training run can always be reproduced from its
//! cached inputs.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use ndarray::Array3;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::IoError;

/// Prepared driver (feature) arrays with their standardization
/// statistics.
///
/// Both value arrays are `(n_segs, n_dates, n_vars)` with the variable
/// axis ordered as `x_vars`. `x_mean` / `x_std` are the train-partition
/// statistics the values were standardized with; `value * std + mean`
/// recovers the raw source.
#[derive(Debug, Clone)]
pub struct XBundle {
    /// Standardized training values.
    pub x_trn: Array3<f64>,
    /// Standardized test values.
    pub x_tst: Array3<f64>,
    /// Training dates, ascending.
    pub dates_trn: Vec<NaiveDate>,
    /// Test dates, ascending.
    pub dates_tst: Vec<NaiveDate>,
    /// Segment ids, in array order.
    pub seg_ids: Vec<i64>,
    /// Variable names, in array order.
    pub x_vars: Vec<String>,
    /// Per-variable train mean.
    pub x_mean: Vec<f64>,
    /// Per-variable train standard deviation.
    pub x_std: Vec<f64>,
}

/// Prepared target arrays: standardized gap-filled observations, their
/// weights, and the standardized pretraining (simulated) targets.
///
/// Observation arrays are ordered by `y_vars_ft`, pretraining arrays by
/// `y_vars_pt`. The weight arrays are binary: 1.0 marks a genuine
/// observation, 0.0 an imputed or excluded cell.
#[derive(Debug, Clone)]
pub struct YBundle {
    /// Standardized filled observation values, training partition.
    pub y_obs_trn: Array3<f64>,
    /// Standardized filled observation values, test partition.
    pub y_obs_tst: Array3<f64>,
    /// Observation weights, training partition.
    pub y_wgts_trn: Array3<f64>,
    /// Observation weights, test partition.
    pub y_wgts_tst: Array3<f64>,
    /// Standardized pretraining targets, training partition.
    pub y_pre_trn: Array3<f64>,
    /// Standardized pretraining targets, test partition.
    pub y_pre_tst: Array3<f64>,
    /// Training dates, ascending (aligned with the X bundle).
    pub dates_trn: Vec<NaiveDate>,
    /// Test dates, ascending (aligned with the X bundle).
    pub dates_tst: Vec<NaiveDate>,
    /// Segment ids, in array order (aligned with the X bundle).
    pub seg_ids: Vec<i64>,
    /// Fine-tuning variable names, in array order.
    pub y_vars_ft: Vec<String>,
    /// Pretraining variable names, in array order.
    pub y_vars_pt: Vec<String>,
    /// Weighted train mean per fine-tuning variable.
    pub y_obs_mean: Vec<f64>,
    /// Weighted train standard deviation per fine-tuning variable.
    pub y_obs_std: Vec<f64>,
    /// Train mean per pretraining variable.
    pub y_pre_mean: Vec<f64>,
    /// Train standard deviation per pretraining variable.
    pub y_pre_std: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XMetadata {
    seg_ids: Vec<i64>,
    dates_trn: Vec<NaiveDate>,
    dates_tst: Vec<NaiveDate>,
    x_vars: Vec<String>,
    x_mean: Vec<f64>,
    x_std: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct YMetadata {
    seg_ids: Vec<i64>,
    dates_trn: Vec<NaiveDate>,
    dates_tst: Vec<NaiveDate>,
    y_vars_ft: Vec<String>,
    y_vars_pt: Vec<String>,
    y_obs_mean: Vec<f64>,
    y_obs_std: Vec<f64>,
    y_pre_mean: Vec<f64>,
    y_pre_std: Vec<f64>,
}

/// Name of the metadata file inside a bundle directory.
const METADATA_FILE: &str = "metadata.json";

/// Writes a driver bundle to `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`IoError::Bundle`] on any filesystem or encoding failure.
pub fn write_x_bundle(dir: &Path, bundle: &XBundle) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|e| bundle_err(dir, e))?;

    write_array(dir, "x_trn.npy", &bundle.x_trn)?;
    write_array(dir, "x_tst.npy", &bundle.x_tst)?;

    let meta = XMetadata {
        seg_ids: bundle.seg_ids.clone(),
        dates_trn: bundle.dates_trn.clone(),
        dates_tst: bundle.dates_tst.clone(),
        x_vars: bundle.x_vars.clone(),
        x_mean: bundle.x_mean.clone(),
        x_std: bundle.x_std.clone(),
    };
    write_metadata(dir, &meta)?;

    info!(dir = %dir.display(), "wrote driver bundle");
    Ok(())
}

/// Reads a driver bundle back from `dir`.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the directory does not exist, or
/// [`IoError::Bundle`] on decoding failures or internally inconsistent
/// shapes.
pub fn read_x_bundle(dir: &Path) -> Result<XBundle, IoError> {
    if !dir.exists() {
        return Err(IoError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let meta: XMetadata = read_metadata(dir)?;
    let bundle = XBundle {
        x_trn: read_array(dir, "x_trn.npy")?,
        x_tst: read_array(dir, "x_tst.npy")?,
        dates_trn: meta.dates_trn,
        dates_tst: meta.dates_tst,
        seg_ids: meta.seg_ids,
        x_vars: meta.x_vars,
        x_mean: meta.x_mean,
        x_std: meta.x_std,
    };

    check_shape(dir, "x_trn", &bundle.x_trn, bundle.seg_ids.len(), bundle.dates_trn.len(), bundle.x_vars.len())?;
    check_shape(dir, "x_tst", &bundle.x_tst, bundle.seg_ids.len(), bundle.dates_tst.len(), bundle.x_vars.len())?;
    check_len(dir, "x_mean", bundle.x_mean.len(), bundle.x_vars.len())?;
    check_len(dir, "x_std", bundle.x_std.len(), bundle.x_vars.len())?;

    Ok(bundle)
}

/// Writes a target bundle to `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`IoError::Bundle`] on any filesystem or encoding failure.
pub fn write_y_bundle(dir: &Path, bundle: &YBundle) -> Result<(), IoError> {
    std::fs::create_dir_all(dir).map_err(|e| bundle_err(dir, e))?;

    write_array(dir, "y_obs_trn.npy", &bundle.y_obs_trn)?;
    write_array(dir, "y_obs_tst.npy", &bundle.y_obs_tst)?;
    write_array(dir, "y_wgts_trn.npy", &bundle.y_wgts_trn)?;
    write_array(dir, "y_wgts_tst.npy", &bundle.y_wgts_tst)?;
    write_array(dir, "y_pre_trn.npy", &bundle.y_pre_trn)?;
    write_array(dir, "y_pre_tst.npy", &bundle.y_pre_tst)?;

    let meta = YMetadata {
        seg_ids: bundle.seg_ids.clone(),
        dates_trn: bundle.dates_trn.clone(),
        dates_tst: bundle.dates_tst.clone(),
        y_vars_ft: bundle.y_vars_ft.clone(),
        y_vars_pt: bundle.y_vars_pt.clone(),
        y_obs_mean: bundle.y_obs_mean.clone(),
        y_obs_std: bundle.y_obs_std.clone(),
        y_pre_mean: bundle.y_pre_mean.clone(),
        y_pre_std: bundle.y_pre_std.clone(),
    };
    write_metadata(dir, &meta)?;

    info!(dir = %dir.display(), "wrote target bundle");
    Ok(())
}

/// Reads a target bundle back from `dir`.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the directory does not exist, or
/// [`IoError::Bundle`] on decoding failures or internally inconsistent
/// shapes.
pub fn read_y_bundle(dir: &Path) -> Result<YBundle, IoError> {
    if !dir.exists() {
        return Err(IoError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let meta: YMetadata = read_metadata(dir)?;
    let bundle = YBundle {
        y_obs_trn: read_array(dir, "y_obs_trn.npy")?,
        y_obs_tst: read_array(dir, "y_obs_tst.npy")?,
        y_wgts_trn: read_array(dir, "y_wgts_trn.npy")?,
        y_wgts_tst: read_array(dir, "y_wgts_tst.npy")?,
        y_pre_trn: read_array(dir, "y_pre_trn.npy")?,
        y_pre_tst: read_array(dir, "y_pre_tst.npy")?,
        dates_trn: meta.dates_trn,
        dates_tst: meta.dates_tst,
        seg_ids: meta.seg_ids,
        y_vars_ft: meta.y_vars_ft,
        y_vars_pt: meta.y_vars_pt,
        y_obs_mean: meta.y_obs_mean,
        y_obs_std: meta.y_obs_std,
        y_pre_mean: meta.y_pre_mean,
        y_pre_std: meta.y_pre_std,
    };

    let (n_segs, n_trn, n_tst) = (
        bundle.seg_ids.len(),
        bundle.dates_trn.len(),
        bundle.dates_tst.len(),
    );
    let n_ft = bundle.y_vars_ft.len();
    let n_pt = bundle.y_vars_pt.len();
    check_shape(dir, "y_obs_trn", &bundle.y_obs_trn, n_segs, n_trn, n_ft)?;
    check_shape(dir, "y_obs_tst", &bundle.y_obs_tst, n_segs, n_tst, n_ft)?;
    check_shape(dir, "y_wgts_trn", &bundle.y_wgts_trn, n_segs, n_trn, n_ft)?;
    check_shape(dir, "y_wgts_tst", &bundle.y_wgts_tst, n_segs, n_tst, n_ft)?;
    check_shape(dir, "y_pre_trn", &bundle.y_pre_trn, n_segs, n_trn, n_pt)?;
    check_shape(dir, "y_pre_tst", &bundle.y_pre_tst, n_segs, n_tst, n_pt)?;
    check_len(dir, "y_obs_mean", bundle.y_obs_mean.len(), n_ft)?;
    check_len(dir, "y_obs_std", bundle.y_obs_std.len(), n_ft)?;
    check_len(dir, "y_pre_mean", bundle.y_pre_mean.len(), n_pt)?;
    check_len(dir, "y_pre_std", bundle.y_pre_std.len(), n_pt)?;

    Ok(bundle)
}

fn bundle_err(path: &Path, e: impl ToString) -> IoError {
    IoError::Bundle {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn write_array(dir: &Path, name: &str, array: &Array3<f64>) -> Result<(), IoError> {
    let path = dir.join(name);
    let mut file = File::create(&path).map_err(|e| bundle_err(&path, e))?;
    array.write_npy(&mut file).map_err(|e| bundle_err(&path, e))
}

fn read_array(dir: &Path, name: &str) -> Result<Array3<f64>, IoError> {
    let path = dir.join(name);
    let file = File::open(&path).map_err(|e| bundle_err(&path, e))?;
    Array3::<f64>::read_npy(file).map_err(|e| bundle_err(&path, e))
}

fn write_metadata<T: Serialize>(dir: &Path, meta: &T) -> Result<(), IoError> {
    let path = dir.join(METADATA_FILE);
    let file = File::create(&path).map_err(|e| bundle_err(&path, e))?;
    serde_json::to_writer_pretty(file, meta).map_err(|e| bundle_err(&path, e))
}

fn read_metadata<T: for<'de> Deserialize<'de>>(dir: &Path) -> Result<T, IoError> {
    let path = dir.join(METADATA_FILE);
    let file = File::open(&path).map_err(|e| bundle_err(&path, e))?;
    serde_json::from_reader(file).map_err(|e| bundle_err(&path, e))
}

fn check_shape(
    dir: &Path,
    name: &str,
    array: &Array3<f64>,
    n_segs: usize,
    n_dates: usize,
    n_vars: usize,
) -> Result<(), IoError> {
    let expected = (n_segs, n_dates, n_vars);
    if array.dim() != expected {
        return Err(bundle_err(
            dir,
            format!(
                "{name}: metadata implies shape {expected:?}, array is {:?}",
                array.dim()
            ),
        ));
    }
    Ok(())
}

fn check_len(dir: &Path, name: &str, got: usize, expected: usize) -> Result<(), IoError> {
    if got != expected {
        return Err(bundle_err(
            dir,
            format!("{name}: expected {expected} entries, got {got}"),
        ));
    }
    Ok(())
}
