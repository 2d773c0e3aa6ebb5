//! Concentric infill.
//!
//! Loops follow the region outline inward, outermost first. Each closed loop is
//! opened at the vertex nearest to where the previous one ended and shortened by
//! `loop_clipping`, so the nozzle steps straight into the next loop.

use super::{adjust_solid_spacing, FillContext, FillPattern, InfillPattern};
use crate::arachne::{generate_loops, ArachneParams};
use crate::clipper::{offset2, offset_expolygon, OffsetJoinType};
use crate::geometry::simplify::{douglas_peucker_thick, simplify_polylines};
use crate::geometry::{ExPolygon, Point, Polygon, Polylines, ThickPolyline, ThickPolylines};
use crate::{scale, unscale, CoordF, Result};
use log::debug;

/// Nested loops following the outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concentric;

impl Concentric {
    /// Loops at `spacing / density`, outside-in.
    fn loops(ctx: &mut FillContext<'_, '_>, expolygon: ExPolygon) -> Vec<Polygon> {
        let min_spacing = scale(ctx.state.spacing);
        let mut distance = ctx.line_pitch();
        if ctx.params.full_infill() && !ctx.params.dont_adjust {
            distance = adjust_solid_spacing(expolygon.bounding_box().width(), distance);
            ctx.state.spacing = unscale(distance);
        }

        let mut loops = expolygon.to_polygons();
        let mut last = vec![expolygon];
        let shrink = unscale(distance + min_spacing / 2);
        let grow = unscale(min_spacing / 2);
        loop {
            last = offset2(&last, shrink, grow, OffsetJoinType::Miter);
            if last.is_empty() {
                break;
            }
            loops.extend(last.iter().flat_map(ExPolygon::to_polygons));
        }
        loops
    }
}

impl FillPattern for Concentric {
    fn pattern(&self) -> InfillPattern {
        InfillPattern::Concentric
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
        if ctx.params.use_arachne {
            let thick = self.fill_surface_single_arachne(ctx, expolygon)?;
            return Ok(thick.iter().map(|t| t.to_polyline()).collect());
        }

        let loop_clipping = ctx.state.loop_clipping as CoordF;
        let mut out: Polylines = Vec::new();
        let mut last_pos = Point::zero();
        for polygon in Self::loops(ctx, expolygon) {
            let Some(idx) = last_pos.nearest_point_index(polygon.points()) else {
                continue;
            };
            let mut polyline = polygon.split_at_index(idx);
            polyline.clip_end(loop_clipping);
            if !polyline.is_valid() {
                continue;
            }
            if ctx.params.prefer_clockwise {
                polyline.reverse();
            }
            last_pos = polyline.last_point();
            out.push(polyline);
        }

        simplify_polylines(&mut out, ctx.params.resolution);
        Ok(out)
    }

    fn fill_surface_single_arachne(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<ThickPolylines> {
        if !ctx.params.use_arachne {
            let polylines = self.fill_surface_single(ctx, expolygon)?;
            let width = scale(ctx.state.spacing);
            return Ok(polylines
                .into_iter()
                .map(|pl| ThickPolyline::from_polyline(pl, width))
                .collect());
        }

        // Beads are laid out from the outline the inset region was taken from.
        let params = ArachneParams::new(
            ctx.state.spacing,
            ctx.params.layer_height,
            ctx.refs.print_config,
            ctx.refs.print_object_config,
        );
        let outline = offset_expolygon(&expolygon, 0.5 * ctx.state.spacing, OffsetJoinType::Miter);

        let loop_clipping = ctx.state.loop_clipping as CoordF;
        let mut out: ThickPolylines = Vec::new();
        let mut last_pos = Point::zero();
        for region in &outline {
            for lp in generate_loops(region, &params) {
                let Some(idx) = last_pos.nearest_point_index(&lp.points) else {
                    continue;
                };
                let mut thick = lp.split_at_index(idx);
                thick.clip_end(loop_clipping);
                if !thick.is_valid() {
                    continue;
                }
                if ctx.params.prefer_clockwise {
                    thick.reverse();
                }
                last_pos = thick.last_point();
                out.push(thick);
            }
        }

        if ctx.params.resolution > 0.0 {
            out = out
                .iter()
                .map(|t| douglas_peucker_thick(t, ctx.params.resolution))
                .collect();
        }
        debug!("concentric: {} variable-width loops", out.len());
        Ok(out)
    }
}
