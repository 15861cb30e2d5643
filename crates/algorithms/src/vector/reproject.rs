//! Pure-Rust zone reprojection (Snyder 1987, USGS formulas).
//!
//! Covers geographic WGS84, Web Mercator (EPSG 3857) and UTM zones
//! (EPSG 326xx North, 327xx South). Any pair of those can be converted by
//! going through WGS84 longitude/latitude. No libproj involved.

use drillstat_core::{CRS, Error, Result};
use geo::{Coord, CoordsIter, Geometry, MapCoords};

// ── WGS84 ellipsoid constants ────────────────────────────────────────────

const A: f64 = 6_378_137.0; // semi-major axis (m)
const F: f64 = 1.0 / 298.257_223_563; // flattening
const E2: f64 = 2.0 * F - F * F; // eccentricity squared
const E_PRIME2: f64 = E2 / (1.0 - E2); // second eccentricity squared
const K0: f64 = 0.9996; // UTM scale factor
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// A projection this module knows how to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Longitude/latitude in degrees
    Geographic,
    /// Spherical ("pseudo") Mercator on the WGS84 semi-major axis
    WebMercator,
    Utm { zone: u32, north: bool },
}

impl Projection {
    /// Recognise a CRS, or `None` if it is not supported
    pub fn from_crs(crs: &CRS) -> Option<Self> {
        match crs.epsg() {
            Some(3857 | 3785 | 900913) => Some(Projection::WebMercator),
            Some(code) => match parse_utm_epsg(code) {
                Some((zone, north)) => Some(Projection::Utm { zone, north }),
                None => crs.is_geographic().then_some(Projection::Geographic),
            },
            None => crs.is_geographic().then_some(Projection::Geographic),
        }
    }

    /// Projected coordinate to WGS84 (longitude, latitude)
    pub fn to_wgs84(&self, c: Coord<f64>) -> Coord<f64> {
        match *self {
            Projection::Geographic => c,
            Projection::WebMercator => {
                let lon = (c.x / A).to_degrees();
                let lat = (2.0 * (c.y / A).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
                Coord { x: lon, y: lat }
            }
            Projection::Utm { zone, north } => {
                let (lon, lat) = utm_to_wgs84(c.x, c.y, zone, north);
                Coord { x: lon, y: lat }
            }
        }
    }

    /// WGS84 (longitude, latitude) to projected coordinate
    pub fn from_wgs84(&self, c: Coord<f64>) -> Coord<f64> {
        match *self {
            Projection::Geographic => c,
            Projection::WebMercator => {
                if c.y.abs() > WEB_MERCATOR_MAX_LAT {
                    return Coord { x: f64::NAN, y: f64::NAN };
                }
                let x = A * c.x.to_radians();
                let y = A * (std::f64::consts::FRAC_PI_4 + c.y.to_radians() / 2.0).tan().ln();
                Coord { x, y }
            }
            Projection::Utm { zone, north } => {
                let (x, y) = wgs84_to_utm(c.x, c.y, zone, north);
                Coord { x, y }
            }
        }
    }
}

/// Reproject a zone geometry from `from` into `to`.
///
/// Equivalent reference systems return the geometry unchanged. Unsupported
/// reference systems and coordinates that leave the projection's domain are
/// reported as [`Error::GeoOp`].
pub fn reproject_geometry(geom: &Geometry<f64>, from: &CRS, to: &CRS) -> Result<Geometry<f64>> {
    if from.is_equivalent(to) {
        return Ok(geom.clone());
    }

    let unsupported = |crs: &CRS| Error::geo_op("reproject", format!("unsupported CRS {}", crs));
    let src = Projection::from_crs(from).ok_or_else(|| unsupported(from))?;
    let dst = Projection::from_crs(to).ok_or_else(|| unsupported(to))?;
    if src == dst {
        return Ok(geom.clone());
    }

    let out = geom.map_coords(|c| dst.from_wgs84(src.to_wgs84(c)));
    if out.coords_iter().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err(Error::geo_op(
            "reproject",
            format!("coordinates outside the domain of {} -> {}", from, to),
        ));
    }

    Ok(out)
}

/// Parse an EPSG code into UTM zone info: `Some((zone, is_north))`.
///
/// - EPSG 326xx → zone xx, North hemisphere
/// - EPSG 327xx → zone xx, South hemisphere
pub fn parse_utm_epsg(epsg: u32) -> Option<(u32, bool)> {
    if (32601..=32660).contains(&epsg) {
        Some((epsg - 32600, true))
    } else if (32701..=32760).contains(&epsg) {
        Some((epsg - 32700, false))
    } else {
        None
    }
}

fn central_meridian(zone: u32) -> f64 {
    ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians()
}

// ── Forward projection (Snyder 1987, USGS Prof. Paper 1395, pp. 61-64) ──

/// Convert WGS84 (longitude, latitude) in degrees to UTM (easting, northing)
/// in metres for the given zone and hemisphere.
fn wgs84_to_utm(lon_deg: f64, lat_deg: f64, zone: u32, north: bool) -> (f64, f64) {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = A / (1.0 - E2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = E_PRIME2 * cos_lat * cos_lat;
    let a = cos_lat * (lon - central_meridian(zone));
    let m = meridional_arc(lat);

    let a2 = a * a;
    let a4 = a2 * a2;

    // Snyder eq. 8-9
    let easting = K0
        * n
        * (a + (1.0 - t + c) * a2 * a / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * E_PRIME2) * a4 * a / 120.0)
        + FALSE_EASTING;

    // Snyder eq. 8-10
    let northing = K0
        * (m + n
            * tan_lat
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * E_PRIME2) * a4 * a2 / 720.0));

    if north {
        (easting, northing)
    } else {
        (easting, northing + FALSE_NORTHING_SOUTH)
    }
}

/// Meridional arc from equator to latitude `lat` (radians). Snyder eq. 3-21.
fn meridional_arc(lat: f64) -> f64 {
    let e4 = E2 * E2;
    let e6 = e4 * E2;

    A * ((1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
        - (3.0 * E2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

// ── Inverse projection (Snyder eqs. 8-17 to 8-25) ───────────────────────

/// Convert UTM (easting, northing) in metres back to WGS84 degrees
fn utm_to_wgs84(easting: f64, northing: f64, zone: u32, north: bool) -> (f64, f64) {
    let x = easting - FALSE_EASTING;
    let y = if north { northing } else { northing - FALSE_NORTHING_SOUTH };

    let e4 = E2 * E2;
    let e6 = e4 * E2;
    let m = y / K0;
    let mu = m / (A * (1.0 - E2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let root = (1.0 - E2).sqrt();
    let e1 = (1.0 - root) / (1.0 + root);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    // Footpoint latitude
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let sin1 = phi1.sin();
    let cos1 = phi1.cos();
    let tan1 = phi1.tan();

    let c1 = E_PRIME2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let w = 1.0 - E2 * sin1 * sin1;
    let n1 = A / w.sqrt();
    let r1 = A * (1.0 - E2) / (w * w.sqrt());
    let d = x / (n1 * K0);
    let d2 = d * d;
    let d4 = d2 * d2;

    let lat = phi1
        - (n1 * tan1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * E_PRIME2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * E_PRIME2
                    - 3.0 * c1 * c1)
                    * d4
                    * d2
                    / 720.0);

    let lon = central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d2 * d / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * E_PRIME2 + 24.0 * t1 * t1)
                * d4
                * d
                / 120.0)
            / cos1;

    (lon.to_degrees(), lat.to_degrees())
}
