//! Polyline with a per-point extrusion width.

use super::{Point, Polyline};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An open path where every point carries the local extrusion width (scaled units).
///
/// `points` and `widths` always have the same length.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThickPolyline {
    points: Vec<Point>,
    widths: Vec<Coord>,
}

impl ThickPolyline {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every point of `polyline` the same width.
    pub fn from_polyline(polyline: Polyline, width: Coord) -> Self {
        let points = polyline.into_points();
        let widths = vec![width; points.len()];
        Self { points, widths }
    }

    #[inline]
    pub fn push(&mut self, point: Point, width: Coord) {
        self.points.push(point);
        self.widths.push(width);
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn widths(&self) -> &[Coord] {
        &self.widths
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
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn length(&self) -> CoordF {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
        self.widths.reverse();
    }

    /// Shorten the path by `distance` from its end, interpolating the width of the
    /// new end point.
    pub fn clip_end(&mut self, distance: CoordF) {
        let mut remaining = distance;
        while remaining > 0.0 && self.points.len() >= 2 {
            let n = self.points.len();
            let (a, b) = (self.points[n - 2], self.points[n - 1]);
            let edge = a.distance(&b);
            if remaining < edge {
                let t = 1.0 - remaining / edge;
                let (wa, wb) = (self.widths[n - 2], self.widths[n - 1]);
                self.points[n - 1] = Point::new(
                    a.x + ((b.x - a.x) as CoordF * t).round() as Coord,
                    a.y + ((b.y - a.y) as CoordF * t).round() as Coord,
                );
                self.widths[n - 1] = wa + ((wb - wa) as CoordF * t).round() as Coord;
                return;
            }
            remaining -= edge;
            self.points.pop();
            self.widths.pop();
        }
    }

    /// Drop the widths.
    pub fn to_polyline(&self) -> Polyline {
        Polyline::from_points(self.points.clone())
    }
}

impl fmt::Debug for ThickPolyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ThickPolyline({} points)", self.points.len())
    }
}

/// Type alias for a collection of thick polylines.
pub type ThickPolylines = Vec<ThickPolyline>;
