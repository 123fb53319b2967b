//! # naiad-io
//!
//! File formats at the edges of the naiad pipeline: sparse observation
//! CSVs, the long-format simulation Parquet store, YAML exclusion rules,
//! and prepared-bundle persistence (one `.npy` per array plus a
//! `metadata.json`). Bridges on-disk NaN/null sentinels into the
//! `Option<f64>` cell convention of [`naiad_grid`].

mod bundle;
mod error;
mod exclude;
mod observations;
mod sim;

pub use bundle::{read_x_bundle, read_y_bundle, write_x_bundle, write_y_bundle, XBundle, YBundle};
pub use error::IoError;
pub use exclude::{read_exclude_file, ExcludeRule};
pub use observations::{observations_to_grid, read_observations, ObsRecord};
pub use sim::read_simulation;
