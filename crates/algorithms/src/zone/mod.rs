//! Window & mask resolution: where a zone falls on a raster

mod rasterize;
mod resolve;

pub use rasterize::rasterize_mask;
pub use resolve::{resolve_window, ResolvedZone, ZoneOptions};
