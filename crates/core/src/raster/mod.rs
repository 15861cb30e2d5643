//! Raster georeferencing, pixel windows and sample buffers

mod buffer;
mod geotransform;
mod window;

pub use buffer::{BandBuffer, DataType};
pub use geotransform::GeoTransform;
pub use window::{MembershipMask, PixelWindow, MASK_INSIDE};
