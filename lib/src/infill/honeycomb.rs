//! Honeycomb infill.
//!
//! Columns of zig-zag lines, each pair of neighbouring columns closing a row of
//! hexagons. The columns are laid out on a grid anchored at the world origin
//! rather than at the region, so that the cells of consecutive layers stack.

use super::connect::{chain_polylines, connect_infill};
use super::{FillContext, FillPattern, InfillPattern};
use crate::clipper::intersection_pl;
use crate::geometry::{align_to_grid, ExPolygon, Point, Polyline, Polylines};
use crate::{scale, Coord, CoordF, Result};
use log::debug;

const SQRT_3: CoordF = 1.732_050_807_568_877_2;

/// Cell dimensions for one spacing/density combination (scaled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HexCell {
    /// Distance between parallel sides of a cell.
    distance: Coord,
    hex_side: Coord,
    hex_width: Coord,
    pattern_height: Coord,
    /// Height of the slanted part of a side.
    y_short: Coord,
    /// Half a line width, so that touching sides of two columns merge.
    x_offset: Coord,
    y_offset: Coord,
    /// Rotation center of the pattern.
    hex_center: Point,
}

impl HexCell {
    fn new(spacing: CoordF, density: CoordF) -> Self {
        let min_spacing = scale(spacing);
        let distance = (min_spacing as CoordF / density) as Coord;
        let hex_side = (distance as CoordF / (SQRT_3 / 2.0)) as Coord;
        let hex_width = distance * 2;
        let x_offset = min_spacing / 2;
        Self {
            distance,
            hex_side,
            hex_width,
            pattern_height: 3 * hex_side,
            y_short: (distance as CoordF * SQRT_3 / 3.0) as Coord,
            x_offset,
            y_offset: (x_offset as CoordF * SQRT_3 / 3.0) as Coord,
            hex_center: Point::new(hex_width / 2, hex_side),
        }
    }

    /// Zig-zag columns covering `expolygon` rotated by `angle`, in world space.
    fn columns(&self, expolygon: &ExPolygon, angle: CoordF) -> Polylines {
        let mut bb_polygon = expolygon.contour.bounding_box().polygon();
        bb_polygon.rotate_around(angle, self.hex_center);
        let mut bbox = bb_polygon.bounding_box();
        bbox.merge_point(align_to_grid(
            bbox.min,
            Point::new(self.hex_width, self.pattern_height),
        ));

        let row_step = 2 * (self.y_short + self.hex_side);
        let mut columns = Vec::new();
        let mut x = bbox.min.x;
        while x <= bbox.max.x {
            let mut points: Vec<Point> = Vec::new();
            let mut ax = [x + self.x_offset, x + self.distance - self.x_offset];
            for _ in 0..2 {
                // second half runs back down
                points.reverse();
                let mut y = bbox.min.y;
                while y <= bbox.max.y {
                    points.push(Point::new(ax[1], y + self.y_offset));
                    points.push(Point::new(ax[0], y + self.y_short - self.y_offset));
                    points.push(Point::new(
                        ax[0],
                        y + self.y_short + self.hex_side + self.y_offset,
                    ));
                    points.push(Point::new(
                        ax[1],
                        y + 2 * self.y_short + self.hex_side - self.y_offset,
                    ));
                    points.push(Point::new(
                        ax[1],
                        y + 2 * self.y_short + 2 * self.hex_side + self.y_offset,
                    ));
                    y += row_step;
                }
                ax = [ax[1] + self.distance, ax[0] + self.distance];
                x += self.distance;
            }
            let mut column = Polyline::from_points(points);
            column.rotate_around(-angle, self.hex_center);
            columns.push(column);
        }
        columns
    }
}

/// Hexagonal cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct Honeycomb;

impl FillPattern for Honeycomb {
    fn pattern(&self) -> InfillPattern {
        InfillPattern::Honeycomb
    }

    fn clone_box(&self) -> Box<dyn FillPattern> {
        Box::new(*self)
    }

    fn is_self_crossing(&self) -> bool {
        false
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let cell = HexCell::new(ctx.state.spacing, ctx.params.density);
        let columns = cell.columns(&expolygon, ctx.direction.angle);
        let lines = intersection_pl(&columns, std::slice::from_ref(&expolygon));
        debug!("honeycomb: {} columns, {} clipped lines", columns.len(), lines.len());

        if ctx.params.dont_connect() || ctx.params.complete || lines.len() <= 1 {
            return Ok(chain_polylines(lines));
        }
        Ok(connect_infill(
            lines,
            &expolygon,
            ctx.state.spacing,
            ctx.state.link_max_length,
            &ctx.params,
        ))
    }
}
