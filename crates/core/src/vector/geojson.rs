//! GeoJSON models for zone geometries.
//!
//! Lightweight serde models covering what a drill request carries: a Feature,
//! a FeatureCollection or a bare Geometry, optionally with a legacy named
//! `crs` member.

use crate::crs::CRS;
use crate::error::{Error, Result};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::Deserialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Serde models
// ---------------------------------------------------------------------------

type Position = Vec<f64>;

/// A GeoJSON geometry object.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum GeoJsonGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<GeoJsonGeometry> },
}

/// Legacy (2008 draft) named CRS member.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NamedCrs {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl NamedCrs {
    pub(crate) fn to_crs(&self) -> Option<CRS> {
        let name = self.properties.as_ref()?.get("name")?.as_str()?;
        CRS::from_authority(name)
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub crs: Option<NamedCrs>,
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeoJsonFeatureCollection {
    pub features: Vec<GeoJsonFeature>,
    #[serde(default)]
    pub crs: Option<NamedCrs>,
}

/// Top-level GeoJSON document, dispatched on its `type` member.
#[derive(Debug, Clone)]
pub(crate) enum GeoJsonDocument {
    FeatureCollection(GeoJsonFeatureCollection),
    Feature(GeoJsonFeature),
    Geometry(GeoJsonGeometry, Option<CRS>),
}

impl GeoJsonDocument {
    pub(crate) fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Input("GeoJSON object has no \"type\" member".into()))?
            .to_string();

        match kind.as_str() {
            "FeatureCollection" => Ok(Self::FeatureCollection(serde_json::from_value(value)?)),
            "Feature" => Ok(Self::Feature(serde_json::from_value(value)?)),
            _ => {
                let crs = value
                    .get("crs")
                    .cloned()
                    .and_then(|c| serde_json::from_value::<NamedCrs>(c).ok())
                    .and_then(|c| c.to_crs());
                Ok(Self::Geometry(serde_json::from_value(value)?, crs))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion to geo-types
// ---------------------------------------------------------------------------

fn to_coord(p: &[f64]) -> Result<Coord<f64>> {
    match p {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        [_, _, ..] => Err(Error::Input("non-finite coordinate in geometry".into())),
        _ => Err(Error::Input(format!(
            "position needs at least 2 values, got {}",
            p.len()
        ))),
    }
}

fn to_line_string(positions: &[Position]) -> Result<LineString<f64>> {
    if positions.len() < 2 {
        return Err(Error::Input("line string needs at least 2 positions".into()));
    }
    let coords = positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::new(coords))
}

fn to_polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        if ring.len() < 3 {
            return Err(Error::Input("polygon ring needs at least 3 positions".into()));
        }
        to_line_string(ring)
    });

    let exterior = rings
        .next()
        .ok_or_else(|| Error::Input("polygon has no exterior ring".into()))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

impl GeoJsonGeometry {
    pub(crate) fn to_geometry(&self) -> Result<Geometry<f64>> {
        let geom = match self {
            GeoJsonGeometry::Point { coordinates } => {
                Geometry::Point(Point(to_coord(coordinates)?))
            }
            GeoJsonGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
                coordinates
                    .iter()
                    .map(|p| to_coord(p).map(Point))
                    .collect::<Result<Vec<_>>>()?,
            )),
            GeoJsonGeometry::LineString { coordinates } => {
                Geometry::LineString(to_line_string(coordinates)?)
            }
            GeoJsonGeometry::MultiLineString { coordinates } => {
                Geometry::MultiLineString(MultiLineString::new(
                    coordinates
                        .iter()
                        .map(|l| to_line_string(l))
                        .collect::<Result<Vec<_>>>()?,
                ))
            }
            GeoJsonGeometry::Polygon { coordinates } => Geometry::Polygon(to_polygon(coordinates)?),
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                Geometry::MultiPolygon(MultiPolygon::new(
                    coordinates
                        .iter()
                        .map(|p| to_polygon(p))
                        .collect::<Result<Vec<_>>>()?,
                ))
            }
            GeoJsonGeometry::GeometryCollection { geometries } => {
                Geometry::GeometryCollection(GeometryCollection::new_from(
                    geometries
                        .iter()
                        .map(|g| g.to_geometry())
                        .collect::<Result<Vec<_>>>()?,
                ))
            }
        };
        Ok(geom)
    }
}
