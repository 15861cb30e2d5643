//! Bounding boxes and raster envelopes

use drillstat_core::Georeference;
use geo::{BoundingRect, Coord, Geometry, LineString, Polygon};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// The four corners, counter-clockwise from (min_x, min_y)
    pub fn corners(&self) -> [Coord<f64>; 4] {
        [
            Coord { x: self.min_x, y: self.min_y },
            Coord { x: self.max_x, y: self.min_y },
            Coord { x: self.max_x, y: self.max_y },
            Coord { x: self.min_x, y: self.max_y },
        ]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        let [a, b, c, d] = self.corners();
        Polygon::new(LineString::new(vec![a, b, c, d, a]), vec![])
    }
}

/// Compute the bounding box of a geometry
pub fn bounding_box(geom: &Geometry<f64>) -> Option<BoundingBox> {
    geom.bounding_rect().map(|rect| BoundingBox {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}

/// Georeferenced footprint of a whole raster
pub fn raster_envelope(georef: &Georeference) -> BoundingBox {
    let (min_x, min_y, max_x, max_y) = georef.bounds();
    BoundingBox::new(min_x, min_y, max_x, max_y)
}
