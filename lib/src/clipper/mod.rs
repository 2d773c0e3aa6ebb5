//! Clipper polygon boolean and offset operations.
//!
//! Offsets and booleans go through the geo-clipper library. Distances passed to the
//! offset functions are in mm; results come back in scaled coordinates and in
//! canonical orientation (contours counter-clockwise, holes clockwise).
//!
//! Polyline clipping against regions is done natively with exact segment/edge
//! intersections so that clipped infill lines end precisely on the boundary.

use crate::geometry::{ExPolygon, ExPolygons, Line, Point, Polygon, Polyline, Polylines};
use crate::{scale, unscale, CoordF};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

/// Clipper works on integers internally; geo coordinates are in mm, so 1000 gives
/// micron resolution.
const CLIPPER_FACTOR: f64 = 1000.0;

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Square corners
    Square,
    /// Round corners
    #[default]
    Round,
    /// Mitered corners
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(0.25),
            OffsetJoinType::Miter => JoinType::Miter(3.0),
        }
    }
}

fn ring_to_geo(points: &[Point]) -> LineString<f64> {
    let mut ring: Vec<GeoCoord<f64>> = points
        .iter()
        .map(|p| GeoCoord {
            x: unscale(p.x),
            y: unscale(p.y),
        })
        .collect();
    // Close the ring if needed
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
        if first != *last {
            ring.push(first);
        }
    }
    LineString::new(ring)
}

fn geo_to_ring(ring: &LineString<f64>) -> Polygon {
    let mut points: Vec<Point> = ring
        .coords()
        .map(|c| Point::new(scale(c.x), scale(c.y)))
        .collect();
    // Our Polygon doesn't store the closing point
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::from_points(points)
}

fn expolygon_to_geo(expoly: &ExPolygon) -> GeoPolygon<f64> {
    GeoPolygon::new(
        ring_to_geo(expoly.contour.points()),
        expoly.holes.iter().map(|h| ring_to_geo(h.points())).collect(),
    )
}

fn geo_multi_to_expolygons(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .0
        .iter()
        .filter_map(|geo_poly| {
            let contour = geo_to_ring(geo_poly.exterior());
            if contour.len() < 3 {
                return None;
            }
            let holes = geo_poly
                .interiors()
                .iter()
                .map(geo_to_ring)
                .filter(|h| h.len() >= 3)
                .collect();
            let mut expoly = ExPolygon::with_holes(contour, holes);
            expoly.make_canonical();
            Some(expoly)
        })
        .collect()
}

fn expolygons_to_geo_multi(expolys: &[ExPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(expolys.iter().map(expolygon_to_geo).collect())
}

// ============================================================================
// Offset Operations
// ============================================================================

/// Offset an ExPolygon by a given distance.
///
/// # Arguments
/// * `expolygon` - The region to offset
/// * `delta` - The offset distance in mm (positive = grow, negative = shrink)
/// * `join_type` - The type of join to use at corners
pub fn offset_expolygon(
    expolygon: &ExPolygon,
    delta: CoordF,
    join_type: OffsetJoinType,
) -> ExPolygons {
    if expolygon.is_empty() {
        return vec![];
    }
    if delta == 0.0 {
        let mut same = expolygon.clone();
        same.make_canonical();
        return vec![same];
    }
    let result = expolygon_to_geo(expolygon).offset(
        delta,
        join_type.into(),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    );
    geo_multi_to_expolygons(&result)
}

/// Offset multiple ExPolygons by a given distance (mm).
pub fn offset_expolygons(
    expolygons: &[ExPolygon],
    delta: CoordF,
    join_type: OffsetJoinType,
) -> ExPolygons {
    if expolygons.is_empty() {
        return vec![];
    }
    let result = expolygons_to_geo_multi(expolygons).offset(
        delta,
        join_type.into(),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    );
    geo_multi_to_expolygons(&result)
}

/// Shrink (inset) ExPolygons by a given distance (mm).
pub fn shrink(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, -distance.abs(), join_type)
}

/// Grow (outset) ExPolygons by a given distance (mm).
pub fn grow(expolygons: &[ExPolygon], distance: CoordF, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, distance.abs(), join_type)
}

/// Offset2: shrink by `shrink_amount`, then grow by `grow_amount` (both mm).
///
/// Features thinner than twice the shrink amount disappear.
pub fn offset2(
    expolygons: &[ExPolygon],
    shrink_amount: CoordF,
    grow_amount: CoordF,
    join_type: OffsetJoinType,
) -> ExPolygons {
    let shrunk = shrink(expolygons, shrink_amount, join_type);
    if shrunk.is_empty() {
        return vec![];
    }
    grow(&shrunk, grow_amount, join_type)
}

// ============================================================================
// Polyline Clipping
// ============================================================================

fn boundary_lines(clip: &[ExPolygon]) -> Vec<Line> {
    clip.iter()
        .flat_map(|ex| std::iter::once(&ex.contour).chain(ex.holes.iter()))
        .flat_map(Polygon::lines)
        .collect()
}

fn inside_any(p: &Point, clip: &[ExPolygon]) -> bool {
    clip.iter().any(|ex| ex.contains_point(p))
}

/// Parameters in (0, 1) where segment `a`-`b` crosses any of `edges`, sorted.
fn crossing_params(a: Point, b: Point, edges: &[Line]) -> Vec<CoordF> {
    let d1 = b - a;
    let mut params: Vec<CoordF> = edges
        .iter()
        .filter_map(|edge| {
            let d2 = edge.direction();
            let cross = d1.cross(&d2);
            if cross == 0 {
                return None;
            }
            let diff = edge.a - a;
            let t = diff.cross(&d2) as CoordF / cross as CoordF;
            let u = diff.cross(&d1) as CoordF / cross as CoordF;
            ((0.0..=1.0).contains(&u) && t > 0.0 && t < 1.0).then_some(t)
        })
        .collect();
    params.sort_by(|x, y| x.total_cmp(y));
    params.dedup_by(|x, y| (*x - *y).abs() < 1e-12);
    params
}

fn lerp_point(a: Point, b: Point, t: CoordF) -> Point {
    Point::new(
        a.x + ((b.x - a.x) as CoordF * t).round() as i64,
        a.y + ((b.y - a.y) as CoordF * t).round() as i64,
    )
}

/// Clip polylines to a set of regions, keeping the parts inside.
///
/// In libslic3r terms this is `intersection_pl()`. Each input polyline may produce
/// several output polylines; their order follows the input and the direction of
/// travel along each input polyline.
pub fn intersection_pl(polylines: &[Polyline], clip: &[ExPolygon]) -> Polylines {
    if polylines.is_empty() || clip.is_empty() {
        return vec![];
    }
    let edges = boundary_lines(clip);
    let mut result = Vec::new();

    for polyline in polylines {
        let mut current: Vec<Point> = Vec::new();
        for w in polyline.points().windows(2) {
            let (a, b) = (w[0], w[1]);
            if a == b {
                continue;
            }
            let mut cuts = vec![0.0];
            cuts.extend(crossing_params(a, b, &edges));
            cuts.push(1.0);
            for span in cuts.windows(2) {
                let (t0, t1) = (span[0], span[1]);
                let mid = lerp_point(a, b, 0.5 * (t0 + t1));
                let p0 = lerp_point(a, b, t0);
                let p1 = lerp_point(a, b, t1);
                if inside_any(&mid, clip) {
                    if current.last() != Some(&p0) {
                        if current.len() >= 2 {
                            result.push(Polyline::from_points(std::mem::take(&mut current)));
                        }
                        current.clear();
                        current.push(p0);
                    }
                    if p1 != p0 {
                        current.push(p1);
                    }
                } else if current.len() >= 2 {
                    result.push(Polyline::from_points(std::mem::take(&mut current)));
                } else {
                    current.clear();
                }
            }
        }
        if current.len() >= 2 {
            result.push(Polyline::from_points(current));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn make_square_mm(x: f64, y: f64, size: f64) -> ExPolygon {
        ExPolygon::rectangle(Point::new_scale(x, y), Point::new_scale(x + size, y + size))
    }

    #[test]
    fn test_offset_shrink() {
        let result = offset_expolygon(&make_square_mm(0.0, 0.0, 10.0), -1.0, OffsetJoinType::Miter);
        assert_eq!(result.len(), 1);
        let area_mm2 = result[0].area() / (crate::SCALING_FACTOR * crate::SCALING_FACTOR);
        assert!((area_mm2 - 64.0).abs() < 0.01, "area {}", area_mm2);
        assert!(result[0].contour.signed_area() > 0.0);
    }

    #[test]
    fn test_offset_shrink_to_nothing() {
        let result = offset_expolygon(&make_square_mm(0.0, 0.0, 2.0), -1.5, OffsetJoinType::Miter);
        assert!(result.is_empty());
    }

    #[test]
    fn test_grow_merges_neighbours() {
        let a = make_square_mm(0.0, 0.0, 10.0);
        let b = make_square_mm(10.5, 0.0, 10.0);
        let grown = grow(&[a, b], 0.5, OffsetJoinType::Miter);
        assert_eq!(grown.len(), 1);
        let area_mm2 = grown[0].area() / 1e12;
        assert!((area_mm2 - 21.5 * 11.0).abs() < 0.01, "area {}", area_mm2);
    }

    #[test]
    fn test_shrunk_hole_stays_clockwise() {
        let mut hole = Polygon::rectangle(Point::new_scale(3.0, 3.0), Point::new_scale(7.0, 7.0));
        hole.reverse();
        let region = ExPolygon::with_holes(make_square_mm(0.0, 0.0, 10.0).contour, vec![hole]);
        let inset = shrink(&[region], 0.5, OffsetJoinType::Miter);
        assert_eq!(inset.len(), 1);
        assert_eq!(inset[0].holes.len(), 1);
        assert!(inset[0].holes[0].signed_area() < 0.0);
    }

    #[test]
    fn test_offset2_removes_thin_features() {
        let thin = ExPolygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(10.0, 0.5));
        assert!(offset2(&[thin], 0.5, 0.5, OffsetJoinType::Miter).is_empty());
    }

    #[test]
    fn test_intersection_pl_crosses_square() {
        let square = make_square_mm(0.0, 0.0, 10.0);
        let line = Polyline::from_points(vec![
            Point::new_scale(-5.0, 5.0),
            Point::new_scale(15.0, 5.0),
        ]);
        let clipped = intersection_pl(&[line], &[square]);
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped[0].first_point(), Point::new_scale(0.0, 5.0));
        assert_eq!(clipped[0].last_point(), Point::new_scale(10.0, 5.0));
    }

    #[test]
    fn test_intersection_pl_splits_around_hole() {
        let mut hole = Polygon::rectangle(Point::new_scale(4.0, 4.0), Point::new_scale(6.0, 6.0));
        hole.reverse();
        let region = ExPolygon::with_holes(make_square_mm(0.0, 0.0, 10.0).contour, vec![hole]);
        let line = Polyline::from_points(vec![
            Point::new_scale(-1.0, 5.0),
            Point::new_scale(11.0, 5.0),
        ]);
        let clipped = intersection_pl(&[line], &[region]);
        assert_eq!(clipped.len(), 2);
        assert_eq!(clipped[0].last_point(), Point::new_scale(4.0, 5.0));
        assert_eq!(clipped[1].first_point(), Point::new_scale(6.0, 5.0));
    }

    #[test]
    fn test_intersection_pl_keeps_zigzag_joined() {
        let square = make_square_mm(0.0, 0.0, 10.0);
        let zigzag = Polyline::from_points(vec![
            Point::new_scale(1.0, 1.0),
            Point::new_scale(5.0, 9.0),
            Point::new_scale(9.0, 1.0),
        ]);
        let clipped = intersection_pl(&[zigzag], &[square]);
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped[0].len(), 3);
    }
}
