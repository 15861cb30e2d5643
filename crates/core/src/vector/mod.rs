//! Vector data structures: features parsed from GeoJSON and drill zones

mod geojson;

use crate::crs::{CRS, WGS84};
use crate::error::{Error, Result};
use geo_types::Geometry;
use geojson::{GeoJsonDocument, GeoJsonFeature};
use serde_json::Value;

/// A feature parsed from GeoJSON: its geometry and identifier
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            id: None,
        }
    }

    fn from_geojson(f: &GeoJsonFeature) -> Result<Self> {
        let geometry = f.geometry.as_ref().map(|g| g.to_geometry()).transpose()?;
        let id = f.id.as_ref().map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        Ok(Self { geometry, id })
    }
}

/// Collection of features sharing one CRS
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    /// CRS declared by the document, if any
    pub crs: Option<CRS>,
}

impl FeatureCollection {
    /// Parse a GeoJSON FeatureCollection, Feature or bare Geometry
    pub fn from_geojson(text: &str) -> Result<Self> {
        Self::from_geojson_value(serde_json::from_str(text)?)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self> {
        match GeoJsonDocument::from_value(value)? {
            GeoJsonDocument::FeatureCollection(fc) => Ok(Self {
                features: fc
                    .features
                    .iter()
                    .map(Feature::from_geojson)
                    .collect::<Result<Vec<_>>>()?,
                crs: fc.crs.as_ref().and_then(|c| c.to_crs()),
            }),
            GeoJsonDocument::Feature(f) => Ok(Self {
                crs: f.crs.as_ref().and_then(|c| c.to_crs()),
                features: vec![Feature::from_geojson(&f)?],
            }),
            GeoJsonDocument::Geometry(g, crs) => Ok(Self {
                features: vec![Feature::new(g.to_geometry()?)],
                crs,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// One zone per feature that carries a geometry, in document order
    pub fn zones(&self) -> Vec<Zone> {
        let crs = self.crs.clone().unwrap_or_else(|| WGS84.clone());
        self.features
            .iter()
            .filter_map(|f| {
                f.geometry.clone().map(|g| Zone {
                    geometry: g,
                    crs: crs.clone(),
                    id: f.id.clone(),
                })
            })
            .collect()
    }
}

/// The region statistics are computed over: a geometry tagged with its CRS.
///
/// Zones default to geographic WGS84 coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub geometry: Geometry<f64>,
    pub crs: CRS,
    /// Identifier of the originating feature, if any
    pub id: Option<String>,
}

impl Zone {
    /// A WGS84 zone
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            crs: WGS84.clone(),
            id: None,
        }
    }

    pub fn with_crs(mut self, crs: CRS) -> Self {
        self.crs = crs;
        self
    }

    /// Parse the zone of a GeoJSON Feature or Geometry.
    ///
    /// For a FeatureCollection the first feature with a geometry is used.
    pub fn from_geojson(text: &str) -> Result<Self> {
        Self::from_geojson_value(serde_json::from_str(text)?)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self> {
        FeatureCollection::from_geojson_value(value)?
            .zones()
            .into_iter()
            .next()
            .ok_or_else(|| Error::Input("GeoJSON document has no geometry".into()))
    }
}
