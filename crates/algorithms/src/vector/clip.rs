//! Clipping zones against a raster envelope
//!
//! Areal geometries go through `geo`'s boolean intersection. Points and
//! lines are clipped directly: points by containment, line strings with
//! Cohen-Sutherland segment clipping.

use super::spatial::BoundingBox;
use geo::{
    BooleanOps, Coord, Geometry, GeometryCollection, HasDimensions, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point,
};

/// Intersect a zone with a rectangular envelope.
///
/// Returns `None` when nothing of the zone lies inside the envelope.
pub fn intersect_with_envelope(geom: &Geometry<f64>, env: &BoundingBox) -> Option<Geometry<f64>> {
    let clipped = match geom {
        Geometry::Polygon(p) => clip_areal(MultiPolygon::new(vec![p.clone()]), env),
        Geometry::MultiPolygon(mp) => clip_areal(mp.clone(), env),
        Geometry::Rect(r) => clip_areal(MultiPolygon::new(vec![r.to_polygon()]), env),
        Geometry::Triangle(t) => clip_areal(MultiPolygon::new(vec![t.to_polygon()]), env),
        Geometry::GeometryCollection(gc) => {
            let parts: Vec<Geometry<f64>> = gc
                .iter()
                .filter_map(|g| intersect_with_envelope(g, env))
                .collect();
            Geometry::GeometryCollection(GeometryCollection::new_from(parts))
        }
        other => clip_by_rect(other, env)?,
    };

    if clipped.is_empty() { None } else { Some(clipped) }
}

fn clip_areal(mp: MultiPolygon<f64>, env: &BoundingBox) -> Geometry<f64> {
    let envelope = MultiPolygon::new(vec![env.to_polygon()]);
    Geometry::MultiPolygon(mp.intersection(&envelope))
}

/// Clip a point or line geometry by a rectangular extent.
///
/// Returns `None` if the geometry lies completely outside. Areal geometries
/// are returned unchanged; use [`intersect_with_envelope`] for those.
pub fn clip_by_rect(geom: &Geometry<f64>, rect: &BoundingBox) -> Option<Geometry<f64>> {
    match geom {
        Geometry::Point(p) => rect.contains_point(p.x(), p.y()).then(|| geom.clone()),

        Geometry::MultiPoint(mp) => {
            let inside: Vec<Point<f64>> = mp
                .iter()
                .filter(|p| rect.contains_point(p.x(), p.y()))
                .copied()
                .collect();
            (!inside.is_empty()).then(|| Geometry::MultiPoint(MultiPoint::new(inside)))
        }

        Geometry::Line(line) => clip_segment(line.start, line.end, rect)
            .map(|(c0, c1)| Geometry::LineString(LineString::new(vec![c0, c1]))),

        Geometry::LineString(ls) => {
            let parts = clip_line_string(ls, rect);
            match parts.len() {
                0 => None,
                1 => parts.into_iter().next().map(Geometry::LineString),
                _ => Some(Geometry::MultiLineString(MultiLineString::new(parts))),
            }
        }

        Geometry::MultiLineString(mls) => {
            let parts: Vec<LineString<f64>> = mls
                .iter()
                .flat_map(|ls| clip_line_string(ls, rect))
                .collect();
            (!parts.is_empty()).then(|| Geometry::MultiLineString(MultiLineString::new(parts)))
        }

        other => Some(other.clone()),
    }
}

/// Clip each segment, starting a new part wherever the line leaves the rect
fn clip_line_string(ls: &LineString<f64>, rect: &BoundingBox) -> Vec<LineString<f64>> {
    let mut parts = Vec::new();
    let mut current: Vec<Coord<f64>> = Vec::new();

    for window in ls.0.windows(2) {
        match clip_segment(window[0], window[1], rect) {
            Some((c0, c1)) => {
                if current.last() != Some(&c0) {
                    if current.len() >= 2 {
                        parts.push(LineString::new(std::mem::take(&mut current)));
                    }
                    current.clear();
                    current.push(c0);
                }
                current.push(c1);
            }
            None => {
                if current.len() >= 2 {
                    parts.push(LineString::new(std::mem::take(&mut current)));
                }
                current.clear();
            }
        }
    }

    if current.len() >= 2 {
        parts.push(LineString::new(current));
    }
    parts
}

/// Cohen-Sutherland region codes
const INSIDE: u8 = 0b0000;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const BOTTOM: u8 = 0b0100;
const TOP: u8 = 0b1000;

fn outcode(p: Coord<f64>, rect: &BoundingBox) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.min_x {
        code |= LEFT;
    } else if p.x > rect.max_x {
        code |= RIGHT;
    }
    if p.y < rect.min_y {
        code |= BOTTOM;
    } else if p.y > rect.max_y {
        code |= TOP;
    }
    code
}

fn clip_segment(
    mut p0: Coord<f64>,
    mut p1: Coord<f64>,
    rect: &BoundingBox,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let mut code0 = outcode(p0, rect);
    let mut code1 = outcode(p1, rect);

    loop {
        if (code0 | code1) == INSIDE {
            return Some((p0, p1));
        }
        if (code0 & code1) != 0 {
            return None;
        }

        let code_out = if code0 != INSIDE { code0 } else { code1 };
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;

        let moved = if code_out & TOP != 0 {
            Coord { x: p0.x + dx * (rect.max_y - p0.y) / dy, y: rect.max_y }
        } else if code_out & BOTTOM != 0 {
            Coord { x: p0.x + dx * (rect.min_y - p0.y) / dy, y: rect.min_y }
        } else if code_out & RIGHT != 0 {
            Coord { x: rect.max_x, y: p0.y + dy * (rect.max_x - p0.x) / dx }
        } else {
            Coord { x: rect.min_x, y: p0.y + dy * (rect.min_x - p0.x) / dx }
        };

        if code_out == code0 {
            p0 = moved;
            code0 = outcode(p0, rect);
        } else {
            p1 = moved;
            code1 = outcode(p1, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{Area, Polygon};

    fn unit_rect() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 10.0, 10.0)
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        ))
    }

    #[test]
    fn test_point_inside_and_outside() {
        let inside = Geometry::Point(Point::new(5.0, 5.0));
        assert!(clip_by_rect(&inside, &unit_rect()).is_some());
        let outside = Geometry::Point(Point::new(15.0, 5.0));
        assert!(intersect_with_envelope(&outside, &unit_rect()).is_none());
    }

    #[test]
    fn test_multipoint_keeps_inside_members() {
        let mp = Geometry::MultiPoint(MultiPoint::from(vec![(1.0, 1.0), (20.0, 1.0), (3.0, 3.0)]));
        match intersect_with_envelope(&mp, &unit_rect()) {
            Some(Geometry::MultiPoint(kept)) => assert_eq!(kept.0.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_polygon_partial_overlap() {
        let poly = square(-5.0, -5.0, 5.0, 5.0);
        let clipped = intersect_with_envelope(&poly, &unit_rect()).unwrap();
        assert_relative_eq!(clipped.unsigned_area(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polygon_fully_outside() {
        let poly = square(20.0, 20.0, 30.0, 30.0);
        assert!(intersect_with_envelope(&poly, &unit_rect()).is_none());
    }

    #[test]
    fn test_line_partial() {
        let line = Geometry::LineString(LineString::from(vec![(-5.0, 5.0), (15.0, 5.0)]));
        match clip_by_rect(&line, &unit_rect()) {
            Some(Geometry::LineString(clipped)) => {
                assert_eq!(clipped.0.len(), 2);
                assert_relative_eq!(clipped.0[0].x, 0.0);
                assert_relative_eq!(clipped.0[1].x, 10.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_line_leaving_and_reentering_splits() {
        let line = Geometry::LineString(LineString::from(vec![
            (2.0, 2.0),
            (2.0, 15.0),
            (8.0, 15.0),
            (8.0, 2.0),
        ]));
        match clip_by_rect(&line, &unit_rect()) {
            Some(Geometry::MultiLineString(parts)) => assert_eq!(parts.0.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_line_fully_outside() {
        let line = Geometry::LineString(LineString::from(vec![(20.0, 20.0), (30.0, 30.0)]));
        assert!(clip_by_rect(&line, &unit_rect()).is_none());
    }

    #[test]
    fn test_collection_drops_outside_members() {
        let gc = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            square(2.0, 2.0, 4.0, 4.0),
            Geometry::Point(Point::new(50.0, 50.0)),
        ]));
        match intersect_with_envelope(&gc, &unit_rect()) {
            Some(Geometry::GeometryCollection(kept)) => assert_eq!(kept.0.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
