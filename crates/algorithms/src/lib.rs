//! # drillstat algorithms
//!
//! Zonal statistics over stacks of raster bands.
//!
//! ## Modules
//!
//! - **vector**: bounding boxes, envelope clipping, buffering, reprojection
//! - **zone**: pixel window and membership mask of a zone
//! - **sampler**: stride groups and band reads
//! - **statistics**: mean / coverage fraction, deciles, stride interpolation
//! - **metrics**: bytes read and CPU time per request
//! - **drill**: the per-zone pipeline, serialized requests and batch drilling

mod maybe_rayon;

pub mod drill;
pub mod metrics;
pub mod sampler;
pub mod statistics;
pub mod vector;
pub mod zone;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::drill::{
        drill, drill_zones, run_request, DrillParams, DrillRequest, DrillResult,
    };
    pub use crate::metrics::{MetricsRecorder, RunMetrics};
    pub use crate::statistics::{ClipRange, ResultTable, StatPoint, Statistic};
    pub use crate::zone::{resolve_window, ResolvedZone, ZoneOptions};
    pub use drillstat_core::prelude::*;
}
