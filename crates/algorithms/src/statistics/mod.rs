//! Drill statistics
//!
//! - **aggregate**: mean or coverage fraction of one band over a zone
//! - **deciles**: nearest-rank decile estimates
//! - **interpolate**: rows for bands skipped by stride sampling
//! - **table**: the per-band result table

mod aggregate;
mod deciles;
mod interpolate;
mod table;

pub use aggregate::{aggregate_band, ClipRange, Statistic};
pub use deciles::{compute_deciles, deciles_of_sorted};
pub use interpolate::StrideInterpolator;
pub use table::{ResultTable, StatPoint};
