//! Vector operations on drill zones
//!
//! - Buffer: grow a zone by a small distance
//! - Clip: intersect a zone with a raster envelope
//! - Bounding box: axis-aligned envelopes of zones and rasters
//! - Reproject: move a zone into the raster's reference system

mod buffer;
mod clip;
mod reproject;
mod spatial;

pub use buffer::buffer_zone;
pub use clip::{clip_by_rect, intersect_with_envelope};
pub use reproject::{parse_utm_epsg, reproject_geometry, Projection};
pub use spatial::{bounding_box, raster_envelope, BoundingBox};
