//! All-touched rasterization of a zone into a window-aligned byte mask

use crate::vector::{bounding_box, BoundingBox};
use drillstat_core::{Error, GeoTransform, MembershipMask, PixelWindow, Result};
use geo::dimensions::Dimensions;
use geo::{
    BoundingRect, Contains, Coord, CoordsIter, Geometry, HasDimensions, Intersects, LineString,
    Polygon,
};
use tracing::debug;

/// Fraction of a pixel by which footprints are shrunk before testing, so
/// that a zone merely sharing an edge with a pixel does not claim it.
const TOUCH_TOLERANCE: f64 = 1e-4;

/// Burn `geom` into a mask covering `window` of a raster with `transform`.
///
/// A pixel is inside when the geometry touches its footprint ("all touched"
/// policy) and gets [`MASK_INSIDE`](drillstat_core::raster::MASK_INSIDE).
/// Contact along pixel edges only counts when nothing else in the window is
/// touched, which keeps points sitting exactly on a grid corner visible.
pub fn rasterize_mask(
    geom: &Geometry<f64>,
    window: &PixelWindow,
    transform: &GeoTransform,
) -> Result<MembershipMask> {
    let mut mask = MembershipMask::empty(window);
    if geom.coords_iter().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err(Error::geo_op("rasterize", "zone has non-finite coordinates"));
    }
    let Some(extent) = bounding_box(geom) else {
        return Ok(mask);
    };

    let gt = transform.shifted(window.offset_x, window.offset_y);
    burn(geom, &extent, &gt, window, TOUCH_TOLERANCE, &mut mask);
    if mask.member_count() == 0 {
        burn(geom, &extent, &gt, window, 0.0, &mut mask);
        if mask.member_count() > 0 {
            debug!("Zone only touches pixel edges, burned {} pixels", mask.member_count());
        }
    }

    Ok(mask)
}

/// Pixel block `[col0, col1) x [row0, row1)` of the window
#[derive(Debug, Clone, Copy)]
struct Block {
    col0: usize,
    row0: usize,
    col1: usize,
    row1: usize,
}

impl Block {
    fn is_pixel(&self) -> bool {
        self.col1 - self.col0 == 1 && self.row1 - self.row0 == 1
    }

    /// Halve along the longer side
    fn split(&self) -> (Block, Block) {
        if self.col1 - self.col0 >= self.row1 - self.row0 {
            let mid = (self.col0 + self.col1) / 2;
            (Block { col1: mid, ..*self }, Block { col0: mid, ..*self })
        } else {
            let mid = (self.row0 + self.row1) / 2;
            (Block { row1: mid, ..*self }, Block { row0: mid, ..*self })
        }
    }
}

fn burn(
    geom: &Geometry<f64>,
    extent: &BoundingBox,
    gt: &GeoTransform,
    window: &PixelWindow,
    shrink: f64,
    mask: &mut MembershipMask,
) {
    let areal = geom.dimensions() == Dimensions::TwoDimensional;
    let whole = Block {
        col0: 0,
        row0: 0,
        col1: window.count_x,
        row1: window.count_y,
    };
    burn_block(geom, areal, extent, gt, whole, shrink, mask);
}

/// Blocks the zone misses are skipped and blocks an areal zone contains are
/// filled; everything else is split down to single pixels.
fn burn_block(
    geom: &Geometry<f64>,
    areal: bool,
    extent: &BoundingBox,
    gt: &GeoTransform,
    block: Block,
    shrink: f64,
    mask: &mut MembershipMask,
) {
    let inset = if block.is_pixel() { shrink } else { 0.0 };
    let footprint = block_footprint(gt, &block, inset);
    let overlaps = footprint.bounding_rect().is_some_and(|r| {
        extent.intersects(&BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
    });
    if !overlaps || !geom.intersects(&footprint) {
        return;
    }

    if block.is_pixel() {
        mask.burn(block.row0, block.col0);
    } else if areal && geom.contains(&footprint) {
        for row in block.row0..block.row1 {
            for col in block.col0..block.col1 {
                mask.burn(row, col);
            }
        }
    } else {
        let (a, b) = block.split();
        burn_block(geom, areal, extent, gt, a, shrink, mask);
        burn_block(geom, areal, extent, gt, b, shrink, mask);
    }
}

/// Footprint of a pixel block, inset by `shrink` pixels on every side
fn block_footprint(gt: &GeoTransform, block: &Block, shrink: f64) -> Polygon<f64> {
    let (c0, r0) = (block.col0 as f64 + shrink, block.row0 as f64 + shrink);
    let (c1, r1) = (block.col1 as f64 - shrink, block.row1 as f64 - shrink);
    let corner = |c: f64, r: f64| {
        let (x, y) = gt.apply(c, r);
        Coord { x, y }
    };
    let start = corner(c0, r0);
    Polygon::new(
        LineString::new(vec![start, corner(c1, r0), corner(c1, r1), corner(c0, r1), start]),
        vec![],
    )
}
