//! Buffer operations
//!
//! Zones are grown by a tiny distance before they are clipped and burned so
//! that zero-width slivers and bare points still cover some area.

use geo::{Buffer, Geometry, HasDimensions};
use tracing::warn;

/// Buffer a zone by `distance` (in the zone's own units).
///
/// A non-positive or non-finite distance returns the zone unchanged, and so
/// does a buffer that collapses to an empty geometry.
pub fn buffer_zone(geom: &Geometry<f64>, distance: f64) -> Geometry<f64> {
    if !(distance.is_finite() && distance > 0.0) {
        return geom.clone();
    }

    let buffered = geom.buffer(distance);
    if buffered.is_empty() {
        warn!("Buffering by {} produced an empty zone, using it unbuffered", distance);
        return geom.clone();
    }

    Geometry::MultiPolygon(buffered)
}
