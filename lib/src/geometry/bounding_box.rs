//! Axis-aligned bounding box.
//!
//! A freshly created box is *undefined*: it covers nothing until the first point is
//! merged in. Fill instances use an undefined box as the "not set" marker for their
//! object bounding box.

use super::{Point, Polygon};
use crate::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D axis-aligned bounding box with scaled integer coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    /// Create an undefined (empty) bounding box.
    #[inline]
    pub const fn new() -> Self {
        Self {
            min: Point::new(0, 0),
            max: Point::new(-1, -1),
            defined: false,
        }
    }

    /// Create a bounding box from two corners.
    pub fn from_points_minmax(min: Point, max: Point) -> Self {
        Self {
            min: Point::new(min.x.min(max.x), min.y.min(max.y)),
            max: Point::new(min.x.max(max.x), min.y.max(max.y)),
            defined: true,
        }
    }

    /// Create the smallest bounding box containing all points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Whether at least one point has been merged in.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Whether the box is undefined or has no extent on some axis.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.defined || self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Expand to include a point.
    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Expand to include another bounding box.
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    #[inline]
    pub fn width(&self) -> Coord {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0
        }
    }

    #[inline]
    pub fn height(&self) -> Coord {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0
        }
    }

    /// Size as a vector (width, height).
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    /// Center point. Integer division rounds toward zero like the coordinates do.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    /// Check if a point lies inside or on the border of the box.
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    /// Check if two boxes share at least one point.
    #[inline]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.defined
            && other.defined
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grow the box by `delta` on every side.
    pub fn offset(&mut self, delta: Coord) {
        if self.defined {
            self.min = Point::new(self.min.x - delta, self.min.y - delta);
            self.max = Point::new(self.max.x + delta, self.max.y + delta);
        }
    }

    /// Return a copy grown by `delta` on every side.
    pub fn expanded(&self, delta: Coord) -> Self {
        let mut bb = *self;
        bb.offset(delta);
        bb
    }

    /// The box as a counter-clockwise rectangle.
    pub fn polygon(&self) -> Polygon {
        Polygon::rectangle(self.min, self.max)
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox(undefined)")
        }
    }
}
