//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

/// Geographic WGS84 (EPSG:4326), the reference frame zones are expressed in
/// unless they say otherwise.
pub static WGS84: LazyLock<CRS> = LazyLock::new(|| CRS {
    wkt: Some(WGS84_WKT.to_string()),
    epsg: Some(4326),
    proj: Some("+proj=longlat +datum=WGS84 +no_defs".to_string()),
});

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// WKT representation
    wkt: Option<String>,
    /// EPSG code if known
    epsg: Option<u32>,
    /// PROJ string if available
    proj: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            wkt: None,
            epsg: Some(code),
            proj: None,
        }
    }

    /// Parse an authority string such as `"EPSG:32633"` or a legacy GeoJSON
    /// `"urn:ogc:def:crs:EPSG::4326"` name.
    pub fn from_authority(name: &str) -> Option<Self> {
        if name.ends_with("CRS84") {
            return Some(WGS84.clone());
        }
        let code = name.rsplit(':').next()?.trim().parse::<u32>().ok()?;
        Some(Self::from_epsg(code))
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }


    /// Whether coordinates are longitude/latitude in degrees
    pub fn is_geographic(&self) -> bool {
        match self.epsg {
            Some(code) => code == 4326 || code == 4258 || code == 4283,
            None => self
                .wkt
                .as_deref()
                .is_some_and(|w| w.trim_start().starts_with("GEOGCS")),
        }
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }

        // Comparing WKT text is imperfect but catches identical sources
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (&self.proj, &other.proj) {
            return a == b;
        }

        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(proj) = &self.proj {
            return proj.clone();
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt
                .char_indices()
                .nth(50)
                .map(|(i, _)| i)
                .unwrap_or(wkt.len());
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        WGS84.clone()
    }
}
