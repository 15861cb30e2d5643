//! Raster sources: the interface drill requests read band stacks through,
//! an in-memory implementation, and GeoTIFF I/O.

mod memory;
mod native;

pub use memory::MemoryRaster;
pub use native::{read_band_stack, read_band_stack_from_buffer, write_band_stack, write_band_stack_to_buffer};

use crate::crs::CRS;
use crate::error::Result;
use crate::raster::{BandBuffer, DataType, GeoTransform, PixelWindow};
use serde::{Deserialize, Serialize};

/// Georeferencing of a raster dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Georeference {
    pub transform: GeoTransform,
    /// Spatial reference; `None` when the dataset does not declare one
    pub crs: Option<CRS>,
    /// Raster width in pixels
    pub width: usize,
    /// Raster height in pixels
    pub height: usize,
}

impl Georeference {
    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.width, self.height)
    }
}

/// Per-band metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandInfo {
    pub data_type: DataType,
    pub nodata: Option<f64>,
}

/// A multi-band raster dataset that pixel windows can be read from.
///
/// Band indices are 1-based. One handle serves one request; implementations
/// need not be shareable across threads.
pub trait RasterSource {
    /// Geotransform, spatial reference and pixel size
    fn georeference(&self) -> Georeference;

    /// Number of bands in the dataset
    fn band_count(&self) -> usize;

    /// Data type and no-data value of a band
    fn band_info(&self, band: usize) -> Result<BandInfo>;

    /// Read `window` for each of `bands` (in the given order) into one buffer,
    /// converting samples to `f32`.
    fn read_window(&self, window: &PixelWindow, bands: &[usize]) -> Result<BandBuffer>;
}
