//! Polygon type.
//!
//! A polygon is a closed contour stored without a repeated closing point.
//! Outer contours are counter-clockwise, holes clockwise.

use super::{BoundingBox, Line, Point, Polyline};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A closed polygon.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edges of the polygon including the closing edge.
    pub fn lines(&self) -> Vec<Line> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|i| Line::new(self.points[i], self.points[(i + 1) % n]))
            .collect()
    }

    /// Signed area (shoelace), positive for counter-clockwise, in scaled units squared.
    pub fn signed_area(&self) -> CoordF {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice: i128 = 0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice += a.cross(&b);
        }
        twice as CoordF * 0.5
    }

    #[inline]
    pub fn area(&self) -> CoordF {
        self.signed_area().abs()
    }

    pub fn make_counter_clockwise(&mut self) {
        if self.signed_area() < 0.0 {
            self.points.reverse();
        }
    }

    pub fn make_clockwise(&mut self) {
        if self.signed_area() > 0.0 {
            self.points.reverse();
        }
    }

    #[inline]
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Point-in-polygon test by ray casting. Points on the border may go either way.
    pub fn contains_point(&self, p: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                let x = pi.x as CoordF
                    + (p.y - pi.y) as CoordF * (pj.x - pi.x) as CoordF / (pj.y - pi.y) as CoordF;
                if (p.x as CoordF) < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Closest point on the contour to `p`.
    pub fn closest_point(&self, p: &Point) -> Point {
        match self.points.len() {
            0 => *p,
            1 => self.points[0],
            _ => self
                .lines()
                .iter()
                .map(|l| l.project_point(p))
                .min_by_key(|q| q.distance_squared(p))
                .unwrap_or(self.points[0]),
        }
    }

    pub fn rotate(&mut self, angle: CoordF) {
        let (sin, cos) = angle.sin_cos();
        for p in &mut self.points {
            *p = p.rotate_by_cos_sin(cos, sin);
        }
    }

    pub fn rotate_around(&mut self, angle: CoordF, center: Point) {
        let (sin, cos) = angle.sin_cos();
        for p in &mut self.points {
            *p = (*p - center).rotate_by_cos_sin(cos, sin) + center;
        }
    }

    /// Open the loop at `index`: the polyline starts and ends at that vertex.
    pub fn split_at_index(&self, index: usize) -> Polyline {
        let n = self.points.len();
        if n == 0 {
            return Polyline::new();
        }
        let index = index % n;
        let mut points = Vec::with_capacity(n + 1);
        points.extend_from_slice(&self.points[index..]);
        points.extend_from_slice(&self.points[..index]);
        points.push(self.points[index]);
        Polyline::from_points(points)
    }

    /// Closed polyline starting at the first vertex.
    #[inline]
    pub fn to_polyline(&self) -> Polyline {
        self.split_at_index(0)
    }

    /// At least three vertices and a non-zero area.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3 && self.area() > 0.0
    }

    /// Counter-clockwise axis-aligned rectangle.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points(vec![
            Point::new(min.x, min.y),
            Point::new(max.x, min.y),
            Point::new(max.x, max.y),
            Point::new(min.x, max.y),
        ])
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({} points)", self.points.len())
    }
}

impl Deref for Polygon {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

/// Type alias for a collection of polygons.
pub type Polygons = Vec<Polygon>;
