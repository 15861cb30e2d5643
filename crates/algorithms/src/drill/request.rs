//! Serialized drill requests

use super::{drill, DrillParams, DrillResult};
use crate::statistics::{ClipRange, Statistic};
use crate::zone::ZoneOptions;
use drillstat_core::io::read_band_stack;
use drillstat_core::{Error, RasterSource, Result, Zone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// A self-contained drill request as received over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillRequest {
    /// Band stack to read
    pub path: PathBuf,
    /// GeoJSON Feature or Geometry, either inline or as a JSON string
    pub geometry: Value,
    /// Band indices (1-based); empty means every band
    #[serde(default)]
    pub bands: Vec<usize>,
    #[serde(default = "default_band_strides")]
    pub band_strides: i64,
    #[serde(default)]
    pub decile_count: usize,
    #[serde(default)]
    pub statistic: Statistic,
    #[serde(default = "default_clip_lower")]
    pub clip_lower: f32,
    #[serde(default = "default_clip_upper")]
    pub clip_upper: f32,
    #[serde(default)]
    pub zone_options: ZoneOptions,
}

fn default_band_strides() -> i64 {
    1
}

fn default_clip_lower() -> f32 {
    f32::MIN
}

fn default_clip_upper() -> f32 {
    f32::MAX
}

impl DrillRequest {
    /// Parse a request from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The request's zone
    pub fn zone(&self) -> Result<Zone> {
        match &self.geometry {
            Value::String(text) => Zone::from_geojson(text),
            Value::Object(_) => Zone::from_geojson_value(self.geometry.clone()),
            other => Err(Error::Input(format!(
                "geometry must be a GeoJSON object or string, got {}",
                other
            ))),
        }
    }

    /// Drill parameters for a raster with `band_count` bands
    pub fn params(&self, band_count: usize) -> DrillParams {
        let bands = if self.bands.is_empty() {
            (1..=band_count).collect()
        } else {
            self.bands.clone()
        };
        DrillParams::new(bands)
            .with_band_strides(self.band_strides)
            .with_decile_count(self.decile_count)
            .with_statistic(self.statistic)
            .with_clip(ClipRange::new(self.clip_lower, self.clip_upper))
            .with_zone_options(self.zone_options)
    }
}

/// Open the request's raster and drill its zone
pub fn run_request(request: &DrillRequest) -> Result<DrillResult> {
    // Parse the zone first so malformed geometry never costs a raster read
    let zone = request.zone()?;
    let source = read_band_stack(&request.path)?;
    let params = request.params(source.band_count());
    info!(
        "Drilling {} bands of {} (strides {}, deciles {})",
        params.bands.len(),
        request.path.display(),
        params.band_strides,
        params.decile_count
    );
    drill(&source, &zone, &params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drillstat_core::ErrorKind;

    const MINIMAL: &str = r#"{
        "path": "/data/ndvi.tif",
        "geometry": {"type": "Point", "coordinates": [149.1, -35.3]}
    }"#;

    #[test]
    fn test_defaults() {
        let request = DrillRequest::from_json(MINIMAL).unwrap();
        assert_eq!(request.band_strides, 1);
        assert_eq!(request.decile_count, 0);
        assert_eq!(request.statistic, Statistic::Mean);

        let params = request.params(3);
        assert_eq!(params.bands, vec![1, 2, 3]);
        assert_eq!(params.clip, ClipRange::default());
        assert_eq!(params.zone, ZoneOptions::default());
    }

    #[test]
    fn test_full_request() {
        let request = DrillRequest::from_json(
            r#"{
                "path": "stack.tif",
                "geometry": "{\"type\": \"Feature\", \"properties\": {}, \"geometry\": {\"type\": \"Point\", \"coordinates\": [1, 2]}}",
                "bands": [4, 2],
                "band_strides": -3,
                "decile_count": 9,
                "statistic": "coverage_fraction",
                "clip_lower": 0.2,
                "clip_upper": 0.8,
                "zone_options": {"buffer_pixels": 0.5}
            }"#,
        )
        .unwrap();

        let params = request.params(10);
        assert_eq!(params.bands, vec![4, 2]);
        assert_eq!(params.band_strides, 1);
        assert_eq!(params.columns(), 10);
        assert_eq!(params.statistic, Statistic::CoverageFraction);
        assert_eq!(params.clip, ClipRange::new(0.2, 0.8));
        assert_eq!(params.zone.buffer_pixels, 0.5);

        let zone = request.zone().unwrap();
        assert_eq!(zone.geometry, geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_malformed_requests_are_input_errors() {
        let err = DrillRequest::from_json("{\"path\": 3}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);

        let mut request = DrillRequest::from_json(MINIMAL).unwrap();
        request.geometry = Value::from(12);
        assert_eq!(request.zone().unwrap_err().kind(), ErrorKind::Input);

        request.geometry = Value::from("{\"type\": \"Polygon\", \"coordinates\": [[[0, 0]]]}");
        assert_eq!(request.zone().unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn test_missing_raster_fails_before_drilling() {
        let mut request = DrillRequest::from_json(MINIMAL).unwrap();
        request.path = PathBuf::from("/nonexistent/stack.tif");
        assert!(run_request(&request).is_err());
    }
}
