//! # drillstat core
//!
//! Core types, traits and I/O for the drillstat zonal statistics engine.
//!
//! This crate provides:
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS`: Coordinate Reference System handling, with a shared WGS84 reference
//! - `PixelWindow`, `MembershipMask`, `BandBuffer`: the buffers a drill request works on
//! - `RasterSource`: the interface through which band stacks are read
//! - GeoJSON zone parsing and multi-band GeoTIFF I/O

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::{CRS, WGS84};
pub use error::{Error, ErrorKind, Result};
pub use io::{BandInfo, Georeference, MemoryRaster, RasterSource};
pub use raster::{BandBuffer, DataType, GeoTransform, MembershipMask, PixelWindow};
pub use vector::Zone;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::{CRS, WGS84};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::io::{BandInfo, Georeference, MemoryRaster, RasterSource};
    pub use crate::raster::{BandBuffer, DataType, GeoTransform, MembershipMask, PixelWindow};
    pub use crate::vector::Zone;
}
