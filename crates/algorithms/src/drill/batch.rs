//! Drilling many zones over one band stack

use super::{drill, DrillParams, DrillResult};
use crate::maybe_rayon::*;
use drillstat_core::{RasterSource, Result, Zone};
use tracing::info;

/// Drill every zone independently over a shared source.
///
/// Results come back in zone order. Each zone is its own request: one
/// failing zone does not affect the others. With the `parallel` feature the
/// zones are drilled concurrently, so the CPU times of their metrics overlap.
pub fn drill_zones<S>(source: &S, zones: &[Zone], params: &DrillParams) -> Vec<Result<DrillResult>>
where
    S: RasterSource + Sync + ?Sized,
{
    info!("Drilling {} zones over {} bands", zones.len(), params.bands.len());
    zones
        .into_par_iter()
        .map(|zone| drill(source, zone, params))
        .collect()
}
