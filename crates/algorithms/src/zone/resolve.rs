//! Zone to pixel window resolution

use super::rasterize::rasterize_mask;
use crate::vector::{
    bounding_box, buffer_zone, intersect_with_envelope, raster_envelope, reproject_geometry,
    BoundingBox,
};
use drillstat_core::{Error, Georeference, MembershipMask, PixelWindow, Result, Zone};
use geo::Geometry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Tuning of zone preparation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneOptions {
    /// Buffer distance applied to the reprojected zone, in pixels
    pub buffer_pixels: f64,
}

impl Default for ZoneOptions {
    fn default() -> Self {
        Self { buffer_pixels: 1e-6 }
    }
}

/// Pixel window of a zone together with its membership mask
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedZone {
    pub window: PixelWindow,
    pub mask: MembershipMask,
}

impl ResolvedZone {
    /// The degenerate result for a zone that misses the raster entirely
    fn outside() -> Self {
        let window = PixelWindow::new(0, 0, 1, 1);
        Self {
            mask: MembershipMask::empty(&window),
            window,
        }
    }
}

/// Resolve the pixel window and membership mask of `zone` on a raster.
///
/// The zone is reprojected into the raster CRS (skipped when the raster has
/// none), buffered slightly, and intersected with the raster envelope. The
/// envelope of that intersection is mapped to pixel space through the
/// inverse geotransform. Finally the buffered zone is burned into a mask
/// over the window.
pub fn resolve_window(
    georef: &Georeference,
    zone: &Zone,
    options: &ZoneOptions,
) -> Result<ResolvedZone> {
    let geom = match &georef.crs {
        Some(crs) => reproject_geometry(&zone.geometry, &zone.crs, crs)?,
        None => zone.geometry.clone(),
    };

    let gt = &georef.transform;
    let pixel_size = gt
        .pixel_width
        .hypot(gt.col_rotation)
        .min(gt.pixel_height.hypot(gt.row_rotation));
    let buffered = buffer_zone(&geom, options.buffer_pixels * pixel_size);

    let envelope = raster_envelope(georef);
    let Some(extent) = clipped_extent(&buffered, &geom, &envelope) else {
        warn!("Zone does not intersect the raster envelope");
        return Ok(ResolvedZone::outside());
    };

    let inverse = gt
        .inverse()
        .ok_or_else(|| Error::geo_op("resolve window", "geotransform is not invertible"))?;

    // Geotransforms may flip axes, so take min/max over all four corners
    let (mut min_col, mut min_row) = (f64::INFINITY, f64::INFINITY);
    let (mut max_col, mut max_row) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in extent.corners() {
        let (col, row) = inverse.apply(c.x, c.y);
        min_col = min_col.min(col);
        max_col = max_col.max(col);
        min_row = min_row.min(row);
        max_row = max_row.max(row);
    }

    let window = pixel_window(
        (min_col, max_col),
        (min_row, max_row),
        georef.width,
        georef.height,
    );
    let mut mask = rasterize_mask(&buffered, &window, gt)?;
    if mask.member_count() == 0 && buffered != geom {
        mask = rasterize_mask(&geom, &window, gt)?;
    }
    debug!(
        "Resolved window {:?} with {} of {} pixels inside",
        window,
        mask.member_count(),
        window.len()
    );

    Ok(ResolvedZone { window, mask })
}

/// Envelope of the part of the zone inside the raster.
///
/// Buffered points and lines are slivers far below the precision of the
/// overlay grid of a large envelope, and their intersection can come back
/// empty. The unbuffered zone is clipped instead in that case.
fn clipped_extent(
    buffered: &Geometry<f64>,
    geom: &Geometry<f64>,
    envelope: &BoundingBox,
) -> Option<BoundingBox> {
    intersect_with_envelope(buffered, envelope)
        .and_then(|g| bounding_box(&g))
        .or_else(|| {
            let extent = intersect_with_envelope(geom, envelope).and_then(|g| bounding_box(&g))?;
            debug!("Buffered zone vanished against the raster envelope, using it unbuffered");
            Some(extent)
        })
}

/// Integer window from fractional pixel ranges.
///
/// Offsets and extents truncate toward zero; extents are computed before the
/// offsets are clamped, then forced to at least one pixel and kept inside
/// the raster.
fn pixel_window(cols: (f64, f64), rows: (f64, f64), width: usize, height: usize) -> PixelWindow {
    let axis = |(min, max): (f64, f64), size: usize| {
        let offset = min as i64;
        let count = (max as i64 - offset).max(1);
        let last = size.saturating_sub(1) as i64;
        let offset = offset.clamp(0, last);
        let count = count.min(size as i64 - offset).max(1);
        (offset as usize, count as usize)
    };

    let (offset_x, count_x) = axis(cols, width);
    let (offset_y, count_y) = axis(rows, height);
    PixelWindow::new(offset_x, offset_y, count_x, count_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Projection;
    use drillstat_core::{GeoTransform, CRS, ErrorKind, WGS84};
    use geo::{Coord, LineString, Point, Polygon};

    fn georef() -> Georeference {
        Georeference {
            transform: GeoTransform::new(0.0, 10.0, 1.0, -1.0),
            crs: None,
            width: 10,
            height: 10,
        }
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        ))
    }

    #[test]
    fn test_polygon_window_and_mask() {
        let zone = Zone::new(rect(2.5, 2.5, 5.5, 5.5));
        let resolved = resolve_window(&georef(), &zone, &ZoneOptions::default()).unwrap();

        // cols 2.5..5.5, rows 4.5..7.5 truncate to offset 2/4, extent 3
        assert_eq!(resolved.window, PixelWindow::new(2, 4, 3, 3));
        assert_eq!(resolved.mask.member_count(), 9);
        assert_eq!(resolved.mask.len(), resolved.window.len());
    }

    #[test]
    fn test_zone_clipped_to_raster() {
        let zone = Zone::new(rect(-5.0, 6.5, 3.5, 15.0));
        let resolved = resolve_window(&georef(), &zone, &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(0, 0, 3, 3));
        assert_eq!(resolved.mask.member_count(), 9);
    }

    #[test]
    fn test_zone_outside_raster_is_degenerate() {
        let zone = Zone::new(rect(50.0, 50.0, 60.0, 60.0));
        let resolved = resolve_window(&georef(), &zone, &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(0, 0, 1, 1));
        assert_eq!(resolved.mask.member_count(), 0);
    }

    #[test]
    fn test_point_zone_gets_single_pixel() {
        let zone = Zone::new(Point::new(3.5, 6.5));
        let resolved = resolve_window(&georef(), &zone, &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(3, 3, 1, 1));
        assert_eq!(resolved.mask.member_count(), 1);
    }

    #[test]
    fn test_unbuffered_line_zone() {
        let line = Geometry::LineString(LineString::from(vec![(0.5, 9.5), (3.5, 9.5)]));
        let options = ZoneOptions { buffer_pixels: 0.0 };
        let resolved = resolve_window(&georef(), &Zone::new(line), &options).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(0, 0, 3, 1));
        assert_eq!(resolved.mask.member_count(), 3);
    }

    #[test]
    fn test_zone_reprojected_into_utm_raster() {
        let utm = Projection::Utm { zone: 55, north: false };
        let center = utm.from_wgs84(Coord { x: 149.1, y: -35.3 });
        // 100x100 pixels of 25 m, the point in the middle of pixel (50, 50)
        let georef = Georeference {
            transform: GeoTransform::new(center.x - 1262.5, center.y + 1262.5, 25.0, -25.0),
            crs: Some(CRS::from_epsg(32755)),
            width: 100,
            height: 100,
        };

        let zone = Zone::new(Point::new(149.1, -35.3));
        let resolved = resolve_window(&georef, &zone, &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(50, 50, 1, 1));
        assert_eq!(resolved.mask.member_count(), 1);
    }

    #[test]
    fn test_unsupported_raster_crs_fails() {
        let mut georef = georef();
        georef.crs = Some(CRS::from_epsg(3577));
        let zone = Zone::new(rect(1.0, 1.0, 2.0, 2.0)).with_crs(WGS84.clone());
        let err = resolve_window(&georef, &zone, &ZoneOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GeoOp);
    }

    /// 10000 x 10000 pixels of 25 m
    fn large_georef() -> Georeference {
        Georeference {
            transform: GeoTransform::new(0.0, 250_000.0, 25.0, -25.0),
            crs: None,
            width: 10_000,
            height: 10_000,
        }
    }

    #[test]
    fn test_point_zone_on_large_raster() {
        // center of pixel (5000, 5000)
        let zone = Zone::new(Point::new(125_012.5, 124_987.5));
        let resolved = resolve_window(&large_georef(), &zone, &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(5000, 5000, 1, 1));
        assert_eq!(resolved.mask.member_count(), 1);
    }

    #[test]
    fn test_line_zone_on_large_raster() {
        // along row 4999 from column 4000.5 to 4040.5
        let line = Geometry::LineString(LineString::from(vec![
            (100_012.5, 125_012.5),
            (101_012.5, 125_012.5),
        ]));
        let resolved =
            resolve_window(&large_georef(), &Zone::new(line), &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(4000, 4999, 40, 1));
        assert_eq!(resolved.mask.member_count(), 40);
    }

    #[test]
    fn test_point_zone_on_fine_geographic_raster() {
        let georef = Georeference {
            transform: GeoTransform::new(140.0, -30.0, 0.00025, -0.00025),
            crs: Some(WGS84.clone()),
            width: 40_000,
            height: 20_000,
        };
        // center of pixel (20000, 10000)
        let zone = Zone::new(Point::new(145.000125, -32.500125));
        let resolved = resolve_window(&georef, &zone, &ZoneOptions::default()).unwrap();
        assert_eq!(resolved.window, PixelWindow::new(20_000, 10_000, 1, 1));
        assert_eq!(resolved.mask.member_count(), 1);
    }

    #[test]
    fn test_pixel_window_truncation() {
        assert_eq!(pixel_window((2.5, 5.5), (0.0, 0.0), 10, 10), PixelWindow::new(2, 0, 3, 1));
        // right on the far edge: keep one pixel inside the raster
        assert_eq!(pixel_window((10.0, 10.0), (9.9, 10.0), 10, 10), PixelWindow::new(9, 9, 1, 1));
        assert_eq!(pixel_window((-0.3, 4.2), (1.0, 1.0), 10, 10), PixelWindow::new(0, 1, 4, 1));
    }
}
