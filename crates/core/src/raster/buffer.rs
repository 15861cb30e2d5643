//! Sample data types and multi-band read buffers

use crate::error::{Error, Result};
use ndarray::{Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Native sample type of a raster band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Byte,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    /// A sample type with no known byte size
    Unknown,
}

impl DataType {
    /// Size of one sample in bytes; 0 for [`DataType::Unknown`]
    pub fn size_bytes(&self) -> usize {
        match self {
            DataType::Byte | DataType::Int8 => 1,
            DataType::UInt16 | DataType::Int16 => 2,
            DataType::UInt32 | DataType::Int32 | DataType::Float32 => 4,
            DataType::UInt64 | DataType::Int64 | DataType::Float64 => 8,
            DataType::Unknown => 0,
        }
    }
}

/// Samples of one or more bands over a pixel window, read as `f32`.
///
/// Shape is `(bands, rows, cols)` in standard layout, so the flat sequence is
/// row-major within each band with bands concatenated.
#[derive(Debug, Clone)]
pub struct BandBuffer {
    data: Array3<f32>,
}

impl BandBuffer {
    /// Build a buffer from concatenated row-major band samples
    pub fn from_vec(bands: usize, rows: usize, cols: usize, samples: Vec<f32>) -> Result<Self> {
        let data = Array3::from_shape_vec((bands, rows, cols), samples).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;
        Ok(Self { data })
    }

    pub fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// Number of bands held
    pub fn band_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Samples of the `i`-th band held (0-based position in the read order)
    pub fn band(&self, i: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), i)
    }

    /// Total number of samples across all bands
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
