//! Data preparation for pretrain/fine-tune river-network models.
//!
//! This crate turns raw simulation output and sparse field observations
//! into standardized, gap-filled train/test arrays plus per-cell weight
//! masks. The weights let a downstream loss distinguish genuine
//! observations (weight 1) from cells imputed out of the simulation
//! (weight 0).
//!
//! # Pipeline
//!
//! ```text
//!  ┌─────────────┐     ┌───────────────┐     ┌───────────────────┐
//!  │  prep_x      │────▶│   X bundle    │────▶│  prep_y            │
//!  │  (drivers)   │     │  (axes, stats) │     │  (targets+weights) │
//!  └─────────────┘     └───────────────┘     └───────────────────┘
//! ```
//!
//! `prep_x` fixes the segment/date axes and the train/test boundary;
//! `prep_y` reuses them so that cell *i* of every X array corresponds to
//! cell *i* of every Y array.

mod error;
mod exclude;
mod masks;
mod prep_x;
mod prep_y;
mod split;
mod standardize;

pub use error::PrepError;
pub use exclude::apply_exclude_rules;
pub use masks::{build_weights_and_fill, MaskedTargets};
pub use prep_x::prep_x;
pub use prep_y::prep_y;
pub use split::{split_dates, DateSplit};
pub use standardize::{
    stack_standardized, train_statistics, unstandardize, weighted_train_statistics,
    Standardization,
};

pub use naiad_io::{ExcludeRule, XBundle, YBundle};
