//! Line segment type.

use super::{Point, PointF};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A segment from `a` to `b`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Closest point of the segment to `p`.
    #[inline]
    pub fn project_point(&self, p: &Point) -> Point {
        p.project_onto_segment(&self.a, &self.b)
    }

    /// Distance along a ray from `origin` in unit direction `dir` to this segment,
    /// or None when the ray misses it.
    pub fn ray_hit(&self, origin: PointF, dir: PointF) -> Option<CoordF> {
        let a = PointF::new(self.a.x as CoordF, self.a.y as CoordF);
        let d = self.direction();
        let e = PointF::new(d.x as CoordF, d.y as CoordF);
        let denom = dir.x * e.y - dir.y * e.x;
        if denom.abs() < 1e-12 {
            return None;
        }
        let w = a - origin;
        let t = (w.x * e.y - w.y * e.x) / denom;
        let u = (w.x * dir.y - w.y * dir.x) / denom;
        if t >= 0.0 && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}
