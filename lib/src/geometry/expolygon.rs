//! Polygon with holes.
//!
//! [`ExPolygon`] is the region type handed to the fill engine: one outer contour
//! (counter-clockwise) and any number of holes (clockwise).

use super::{BoundingBox, Point, Polygon, Polygons};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A polygon with holes.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExPolygon {
    /// Outer boundary, counter-clockwise.
    pub contour: Polygon,
    /// Holes, clockwise.
    #[serde(default)]
    pub holes: Vec<Polygon>,
}

impl ExPolygon {
    #[inline]
    pub fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    #[inline]
    pub fn with_holes(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self { contour, holes }
    }

    /// Area of the contour minus the holes.
    pub fn area(&self) -> CoordF {
        let holes: CoordF = self.holes.iter().map(Polygon::area).sum();
        (self.contour.area() - holes).max(0.0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour.len() < 3
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Inside the contour and outside every hole.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.contour.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// Orient the contour counter-clockwise and holes clockwise.
    pub fn make_canonical(&mut self) {
        self.contour.make_counter_clockwise();
        for hole in &mut self.holes {
            hole.make_clockwise();
        }
    }

    pub fn rotate_around(&mut self, angle: CoordF, center: Point) {
        self.contour.rotate_around(angle, center);
        for hole in &mut self.holes {
            hole.rotate_around(angle, center);
        }
    }

    /// Contour followed by holes.
    pub fn to_polygons(&self) -> Polygons {
        let mut out = Vec::with_capacity(self.holes.len() + 1);
        out.push(self.contour.clone());
        out.extend(self.holes.iter().cloned());
        out
    }

    /// Closest point on any boundary (contour or hole).
    pub fn closest_point(&self, p: &Point) -> Point {
        std::iter::once(&self.contour)
            .chain(self.holes.iter())
            .map(|poly| poly.closest_point(p))
            .min_by_key(|q| q.distance_squared(p))
            .unwrap_or(*p)
    }

    /// Axis-aligned rectangle without holes.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::new(Polygon::rectangle(min, max))
    }
}

impl fmt::Debug for ExPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExPolygon(contour: {} points, holes: {})",
            self.contour.len(),
            self.holes.len()
        )
    }
}

impl From<Polygon> for ExPolygon {
    fn from(contour: Polygon) -> Self {
        Self::new(contour)
    }
}

/// Type alias for a collection of ExPolygons.
pub type ExPolygons = Vec<ExPolygon>;

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_hole() -> ExPolygon {
        let mut hole = Polygon::rectangle(Point::new(40, 40), Point::new(60, 60));
        hole.reverse();
        ExPolygon::with_holes(
            Polygon::rectangle(Point::new(0, 0), Point::new(100, 100)),
            vec![hole],
        )
    }

    #[test]
    fn test_area_subtracts_holes() {
        assert!((square_with_hole().area() - 9_600.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_point() {
        let ex = square_with_hole();
        assert!(ex.contains_point(&Point::new(10, 10)));
        assert!(!ex.contains_point(&Point::new(50, 50)));
        assert!(!ex.contains_point(&Point::new(150, 50)));
    }

    #[test]
    fn test_make_canonical() {
        let mut ex = square_with_hole();
        ex.contour.reverse();
        ex.holes[0].reverse();
        ex.make_canonical();
        assert!(ex.contour.signed_area() > 0.0);
        assert!(ex.holes[0].signed_area() < 0.0);
    }

    #[test]
    fn test_closest_point_sees_holes() {
        let ex = square_with_hole();
        assert_eq!(ex.closest_point(&Point::new(50, 45)), Point::new(50, 40));
    }
}
