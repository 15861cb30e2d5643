//! Stride sampling of band stacks
//!
//! The requested bands are cut into contiguous groups of `band_strides`.
//! Only the first and last band of each group are read; the interior is
//! interpolated afterwards.

use crate::metrics::MetricsRecorder;
use drillstat_core::{BandBuffer, DataType, Error, PixelWindow, RasterSource, Result};
use tracing::debug;

/// A contiguous run of requested band indices (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideGroup<'a> {
    bands: &'a [usize],
}

impl<'a> StrideGroup<'a> {
    pub fn bands(&self) -> &'a [usize] {
        self.bands
    }

    /// Number of requested bands the group stands for
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Bands physically read: first and last, or the only one
    pub fn sampled(&self) -> Vec<usize> {
        match self.bands {
            [] => Vec::new(),
            [only] => vec![*only],
            [first, .., last] => vec![*first, *last],
        }
    }

    /// Whether rows between the endpoints must be interpolated
    pub fn interpolates(&self) -> bool {
        self.bands.len() > 2
    }
}

/// Partition `bands` into groups of `band_strides` (the last may be shorter).
///
/// A stride of 0 is treated as 1.
pub fn stride_groups(bands: &[usize], band_strides: usize) -> impl Iterator<Item = StrideGroup<'_>> {
    bands
        .chunks(band_strides.max(1))
        .map(|bands| StrideGroup { bands })
}

/// Reads the sampled bands of each stride group over a fixed window
pub struct BandSampler<'a, S: RasterSource + ?Sized> {
    source: &'a S,
    window: &'a PixelWindow,
    bytes_per_sample: usize,
}

impl<'a, S: RasterSource + ?Sized> BandSampler<'a, S> {
    /// Fails with [`Error::UnsupportedFormat`] when `data_type` has no known
    /// sample size.
    pub fn new(source: &'a S, window: &'a PixelWindow, data_type: DataType) -> Result<Self> {
        let bytes_per_sample = data_type.size_bytes();
        if bytes_per_sample == 0 {
            return Err(Error::UnsupportedFormat(format!(
                "no sample size for raster data type {:?}",
                data_type
            )));
        }
        Ok(Self {
            source,
            window,
            bytes_per_sample,
        })
    }

    /// Read the group's sampled bands and account for the bytes transferred
    pub fn read(&self, group: &StrideGroup<'_>, metrics: &mut MetricsRecorder) -> Result<BandBuffer> {
        let sampled = group.sampled();
        let buffer = self.source.read_window(self.window, &sampled)?;
        metrics.add_bytes(buffer.len() * self.bytes_per_sample);
        debug!(
            "Read bands {:?} of group {:?} ({} samples)",
            sampled,
            group.bands(),
            buffer.len()
        );
        Ok(buffer)
    }
}
