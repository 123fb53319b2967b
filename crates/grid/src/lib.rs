//! Labeled (segment x date) grids for the naiad preprocessing pipeline.
//!
//! River-network data is addressed by a segment identifier (`seg_id_nat`)
//! and a calendar date. This crate provides the shared axis bookkeeping and
//! a [`Dataset`] of named variables over those axes. Cells are
//! `Option<f64>`: a missing observation is `None`, and the NaN sentinel
//! used by on-disk formats is converted at the I/O boundary, never inside
//! the pipeline.

mod axes;
mod dataset;
mod error;

pub use axes::Axes;
pub use dataset::Dataset;
pub use error::GridError;
