//! Polyline type for open paths.
//!
//! Every toolpath the fill engine emits is a [`Polyline`]: an open path from the
//! first point to the last.

use super::{BoundingBox, Line, Point, Polygon};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, Index};

/// An open polyline defined by a sequence of points.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Create a new empty polyline.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polyline from a vector of points.
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

    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the first point, panicking if empty.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Get the last point, panicking if empty.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Get all edges of the polyline.
    pub fn edges(&self) -> Vec<Line> {
        self.points
            .windows(2)
            .map(|w| Line::new(w[0], w[1]))
            .collect()
    }

    /// Calculate the total length of the polyline.
    pub fn length(&self) -> CoordF {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Find the closest point on the polyline to the given point.
    pub fn closest_point(&self, p: &Point) -> Point {
        match self.points.len() {
            0 => Point::zero(),
            1 => self.points[0],
            _ => self
                .edges()
                .iter()
                .map(|e| e.project_point(p))
                .min_by_key(|q| p.distance_squared(q))
                .unwrap_or(self.points[0]),
        }
    }

    pub fn translate(&mut self, v: Point) {
        for p in &mut self.points {
            *p = *p + v;
        }
    }

    /// Rotate the polyline about a center point.
    pub fn rotate_around(&mut self, angle: CoordF, center: Point) {
        let (sin, cos) = angle.sin_cos();
        for p in &mut self.points {
            *p = (*p - center).rotate_by_cos_sin(cos, sin) + center;
        }
    }

    /// Append points of another polyline, skipping its first point when it
    /// coincides with our last one.
    pub fn append(&mut self, other: &Polyline) {
        let skip = usize::from(
            !self.points.is_empty()
                && other.points.first().is_some_and(|p| *p == self.last_point()),
        );
        self.points.extend_from_slice(&other.points[skip..]);
    }

    /// Clip the polyline to a given length from the start.
    pub fn clip_start(&mut self, distance: CoordF) {
        if distance <= 0.0 || self.points.len() < 2 {
            return;
        }

        let mut remaining = distance;
        for i in 0..(self.points.len() - 1) {
            let edge_len = self.points[i].distance(&self.points[i + 1]);
            if remaining < edge_len {
                let t = remaining / edge_len;
                let a = self.points[i];
                let b = self.points[i + 1];
                let new_point = Point::new(
                    (a.x as CoordF + t * (b.x - a.x) as CoordF).round() as i64,
                    (a.y as CoordF + t * (b.y - a.y) as CoordF).round() as i64,
                );
                self.points = std::iter::once(new_point)
                    .chain(self.points[(i + 1)..].iter().copied())
                    .collect();
                return;
            }
            remaining -= edge_len;
        }

        // Entire polyline is shorter than distance
        let last = self.last_point();
        self.points = vec![last];
    }

    /// Clip the polyline to a given length from the end.
    pub fn clip_end(&mut self, distance: CoordF) {
        self.reverse();
        self.clip_start(distance);
        self.reverse();
    }

    /// Check if the polyline is valid (has at least 2 points).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline({} points)", self.points.len())
    }
}

impl Deref for Polyline {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl Index<usize> for Polyline {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

impl From<Polygon> for Polyline {
    fn from(polygon: Polygon) -> Self {
        polygon.to_polyline()
    }
}

/// Type alias for a collection of polylines.
pub type Polylines = Vec<Polyline>;
