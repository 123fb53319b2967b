use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;

/// Top-level naiad configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NaiadConfig {
    /// Input and output paths.
    #[serde(default)]
    pub io: IoToml,

    /// Train/test split settings.
    pub split: SplitToml,

    /// Variable selections.
    #[serde(default)]
    pub variables: VariablesToml,
}

impl NaiadConfig {
    /// Loads and parses a TOML configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    /// Long-format simulation Parquet store.
    pub simulation: Option<PathBuf>,
    /// Observed water-temperature CSV.
    pub obs_temp: Option<PathBuf>,
    /// Observed streamflow CSV.
    pub obs_flow: Option<PathBuf>,
    /// X bundle directory (output of prep-x, input of prep-y).
    pub x_bundle: Option<PathBuf>,
    /// Y bundle output directory.
    pub y_bundle: Option<PathBuf>,
    /// Optional exclusion-rule YAML file.
    pub exclude: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitToml {
    /// First test date, as a quoted ISO string, e.g. "2005-09-15".
    pub test_start_date: NaiveDate,
    /// Length of the test window in whole calendar years.
    #[serde(default = "default_n_test_years")]
    pub n_test_years: u32,
}

fn default_n_test_years() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariablesToml {
    /// Driver variables, in array order.
    #[serde(default = "default_x_vars")]
    pub x_vars: Vec<String>,
    /// Pretraining target variables, in array order.
    #[serde(default = "default_target_vars")]
    pub pretrain: Vec<String>,
    /// Fine-tuning target variables: temperature first, then flow.
    #[serde(default = "default_target_vars")]
    pub finetune: Vec<String>,
}

impl Default for VariablesToml {
    fn default() -> Self {
        Self {
            x_vars: default_x_vars(),
            pretrain: default_target_vars(),
            finetune: default_target_vars(),
        }
    }
}

fn default_x_vars() -> Vec<String> {
    vec!["seg_tave_air".to_string(), "seg_rain".to_string()]
}

fn default_target_vars() -> Vec<String> {
    vec!["seg_tave_water".to_string(), "seg_outflow".to_string()]
}
