//! Pixel-space windows and zone membership masks

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Mask value marking a pixel as inside the zone
pub const MASK_INSIDE: u8 = 255;

/// Integer pixel-space rectangle of a raster.
///
/// Offsets are never negative and both extents are at least 1, even when the
/// zone degenerates to a line or a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWindow {
    pub offset_x: usize,
    pub offset_y: usize,
    pub count_x: usize,
    pub count_y: usize,
}

impl PixelWindow {
    /// Create a window, forcing zero extents up to 1
    pub fn new(offset_x: usize, offset_y: usize, count_x: usize, count_y: usize) -> Self {
        Self {
            offset_x,
            offset_y,
            count_x: count_x.max(1),
            count_y: count_y.max(1),
        }
    }

    /// Number of pixels covered
    pub fn len(&self) -> usize {
        self.count_x * self.count_y
    }

    /// Always false; a window covers at least one pixel
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.count_y, self.count_x)
    }

    /// Whether the window lies inside a raster of `width` x `height` pixels
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.offset_x + self.count_x <= width && self.offset_y + self.count_y <= height
    }
}

/// Byte canvas aligned row-major with a [`PixelWindow`].
///
/// A pixel belongs to the zone when its entry is [`MASK_INSIDE`].
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipMask {
    data: Array2<u8>,
}

impl MembershipMask {
    /// An all-outside mask for the window
    pub fn empty(window: &PixelWindow) -> Self {
        Self {
            data: Array2::zeros(window.shape()),
        }
    }

    /// Build a mask from a row-major byte canvas
    pub fn from_vec(window: &PixelWindow, canvas: Vec<u8>) -> Result<Self> {
        let data = Array2::from_shape_vec(window.shape(), canvas).map_err(|_| {
            Error::InvalidDimensions {
                width: window.count_x,
                height: window.count_y,
            }
        })?;
        Ok(Self { data })
    }

    /// Mark pixel (row, col) as inside the zone
    pub fn burn(&mut self, row: usize, col: usize) {
        if let Some(v) = self.data.get_mut((row, col)) {
            *v = MASK_INSIDE;
        }
    }

    /// Whether pixel (row, col) is inside the zone
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.data.get((row, col)) == Some(&MASK_INSIDE)
    }

    /// Number of pixels inside the zone
    pub fn member_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == MASK_INSIDE).count()
    }

    /// Iterate raw mask bytes in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.data.iter()
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
