//! Geometry primitives for the fill engine.
//!
//! This module provides the fundamental geometric types:
//! - [`Point`] - 2D point with integer coordinates (scaled), [`PointF`] for unscaled math
//! - [`Line`] - Line segment between two points
//! - [`Polygon`] - Closed polygon (boundary)
//! - [`Polyline`] - Open polyline (toolpath)
//! - [`ThickPolyline`] - Open polyline with a width per point
//! - [`ExPolygon`] - Polygon with holes (exterior + interior contours)
//! - [`BoundingBox`] - Axis-aligned bounding box
//!
//! ## Coordinate System
//!
//! Coordinates are scaled by `SCALING_FACTOR` (1,000,000), so 1 unit = 1 nanometer.
//!
//! - Use `scale()` / `scaled()` to convert from mm to internal units
//! - Use `unscale()` / `unscaled()` to convert from internal units to mm

mod bounding_box;
mod expolygon;
mod line;
mod point;
mod polygon;
mod polyline;
pub mod simplify;
mod thick_polyline;

pub use bounding_box::BoundingBox;
pub use expolygon::{ExPolygon, ExPolygons};
pub use line::Line;
pub use point::{Point, PointF, Points};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};
pub use simplify::{douglas_peucker, douglas_peucker_polyline, douglas_peucker_thick};
pub use thick_polyline::{ThickPolyline, ThickPolylines};

use crate::Coord;

/// Snap `p` down onto the grid with the given cell size anchored at the origin.
///
/// Used to keep periodic patterns registered to world coordinates so that they line
/// up between layers whose bounding boxes differ.
pub fn align_to_grid(p: Point, cell: Point) -> Point {
    fn align(v: Coord, step: Coord) -> Coord {
        if step <= 0 {
            v
        } else {
            v.div_euclid(step) * step
        }
    }
    Point::new(align(p.x, cell.x), align(p.y, cell.y))
}

/// Total length of a set of polylines in scaled units.
pub fn total_length(polylines: &[Polyline]) -> crate::CoordF {
    polylines.iter().map(Polyline::length).sum()
}
