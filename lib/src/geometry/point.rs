//! 2D point types.
//!
//! [`Point`] stores scaled integer coordinates (1 unit = 1 nm) and is what every
//! region and toolpath is made of. [`PointF`] is its unscaled floating-point twin,
//! used for directions and intermediate math.

use crate::{scale, unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Create a new point from scaled coordinates.
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a point from coordinates in mm.
    #[inline]
    pub fn new_scale(x: CoordF, y: CoordF) -> Self {
        Self {
            x: scale(x),
            y: scale(y),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Convert to an unscaled floating-point point (mm).
    #[inline]
    pub fn to_f64(&self) -> PointF {
        PointF::new(unscale(self.x), unscale(self.y))
    }

    /// Squared distance to another point. Uses i128 to avoid overflow.
    #[inline]
    pub fn distance_squared(&self, other: &Point) -> i128 {
        let dx = (self.x - other.x) as i128;
        let dy = (self.y - other.y) as i128;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point in scaled units.
    #[inline]
    pub fn distance(&self, other: &Point) -> CoordF {
        (self.distance_squared(other) as CoordF).sqrt()
    }

    /// Length of this point taken as a vector.
    #[inline]
    pub fn length(&self) -> CoordF {
        ((self.x as CoordF).powi(2) + (self.y as CoordF).powi(2)).sqrt()
    }

    /// Rotate about the origin.
    pub fn rotate(&self, angle: CoordF) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.rotate_by_cos_sin(cos, sin)
    }

    /// Rotate about the origin with precomputed cosine and sine.
    #[inline]
    pub fn rotate_by_cos_sin(&self, cos: CoordF, sin: CoordF) -> Self {
        let x = self.x as CoordF;
        let y = self.y as CoordF;
        Self {
            x: (x * cos - y * sin).round() as Coord,
            y: (x * sin + y * cos).round() as Coord,
        }
    }

    /// Rotate about a center point.
    pub fn rotate_around(&self, angle: CoordF, center: Point) -> Self {
        (*self - center).rotate(angle) + center
    }

    /// 2D cross product (z component), i128 to avoid overflow.
    #[inline]
    pub fn cross(&self, other: &Point) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    #[inline]
    pub fn dot(&self, other: &Point) -> i128 {
        self.x as i128 * other.x as i128 + self.y as i128 * other.y as i128
    }

    /// Index of the point in `points` closest to this one.
    pub fn nearest_point_index(&self, points: &[Point]) -> Option<usize> {
        points
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| self.distance_squared(p))
            .map(|(i, _)| i)
    }

    /// Project onto the segment `a`-`b`, clamped to the segment.
    pub fn project_onto_segment(&self, a: &Point, b: &Point) -> Point {
        let ab = *b - *a;
        let len_sq = ab.dot(&ab);
        if len_sq == 0 {
            return *a;
        }
        let t = ((*self - *a).dot(&ab) as CoordF / len_sq as CoordF).clamp(0.0, 1.0);
        Point::new(
            a.x + (ab.x as CoordF * t).round() as Coord,
            a.y + (ab.y as CoordF * t).round() as Coord,
        )
    }

    /// Whether two points coincide within `tolerance` on each axis.
    #[inline]
    pub fn coincides_with(&self, other: &Point, tolerance: Coord) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", unscale(self.x), unscale(self.y))
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<CoordF> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: CoordF) -> Self {
        Self::new(
            (self.x as CoordF * rhs).round() as Coord,
            (self.y as CoordF * rhs).round() as Coord,
        )
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Collection of points.
pub type Points = Vec<Point>;

/// A 2D point with floating-point coordinates (mm or unit vectors).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: CoordF,
    pub y: CoordF,
}

impl PointF {
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    #[inline]
    pub fn from_angle(angle: CoordF) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn dot(&self, other: &PointF) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    /// Normalize to unit length. Zero vectors stay zero.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }

    /// Perpendicular vector, rotated 90 degrees counter-clockwise.
    #[inline]
    pub fn perp(&self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl fmt::Debug for PointF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointF({:.6}, {:.6})", self.x, self.y)
    }
}

impl Add for PointF {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointF {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<CoordF> for PointF {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: CoordF) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
