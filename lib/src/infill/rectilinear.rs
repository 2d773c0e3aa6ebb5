//! Line-family patterns.
//!
//! Every pattern here is built from one or more sweeps of parallel lines produced by
//! [`scan`]: the region is rotated so the lines become vertical, each scan position
//! is intersected with the boundary, and the inside spans are emitted in
//! boustrophedon order before rotating back.
//!
//! - [`Rectilinear`] / [`Monotonic`] - one sweep, alternating 90° per layer
//! - [`Grid`], [`Triangles`], [`Stars`], [`Cubic`] - two or three sweeps crossing
//!   each other, with the density spread across the sweeps
//! - [`SupportBase`] - one sweep connected along the support islands

use super::connect::{chain_polylines, connect_base_support, connect_infill};
use super::{adjust_solid_spacing, FillContext, FillParams, FillPattern, InfillPattern};
use crate::geometry::{ExPolygon, Point, Polygon, Polyline, Polylines};
use crate::{scale, unscale, Coord, CoordF, Error, Result};
use log::trace;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_3};

// ============================================================================
// Scan-line engine
// ============================================================================

/// One family of parallel lines.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    /// Added to the direction angle (radians).
    angle: CoordF,
    /// Phase shift across the lines (scaled).
    shift: Coord,
}

impl Sweep {
    const fn new(angle: CoordF, shift: Coord) -> Self {
        Self { angle, shift }
    }
}

/// Y coordinates where the vertical line at `x` crosses the polygons, sorted.
///
/// An edge counts when `min(a.x, b.x) <= x < max(a.x, b.x)`, so a vertex on the
/// scan line is counted exactly once and vertical edges never.
fn crossings(polygons: &[Polygon], x: Coord) -> Vec<Coord> {
    let mut ys = Vec::new();
    for polygon in polygons {
        let pts = polygon.points();
        for (i, a) in pts.iter().enumerate() {
            let b = &pts[(i + 1) % pts.len()];
            if a.x.min(b.x) <= x && x < a.x.max(b.x) {
                let t = (x - a.x) as i128 * (b.y - a.y) as i128 / (b.x - a.x) as i128;
                ys.push(a.y + t as Coord);
            }
        }
    }
    ys.sort_unstable();
    ys
}

/// Parallel lines across `expolygon` at `angle`, phase anchored to `origin`.
///
/// With `solid` the pitch is stretched so the lines tile the rotated width of the
/// region exactly; otherwise the lines sit at `origin + shift + k * pitch`. Returns
/// the lines in boustrophedon order and the pitch actually used.
fn scan(
    expolygon: &ExPolygon,
    angle: CoordF,
    origin: Point,
    pitch: Coord,
    shift: Coord,
    solid: bool,
) -> Result<(Polylines, Coord)> {
    if pitch <= 0 {
        return Err(Error::Config(format!("line pitch must be positive, got {pitch}")));
    }
    let mut region = expolygon.clone();
    region.rotate_around(-angle, origin);
    let bbox = region.bounding_box();
    if !bbox.is_defined() {
        return Ok((Vec::new(), pitch));
    }

    let (pitch, first) = if solid {
        let pitch = adjust_solid_spacing(bbox.width(), pitch);
        (pitch, bbox.min.x + pitch / 2)
    } else {
        let start = origin.x + shift.rem_euclid(pitch);
        (pitch, start + ((bbox.min.x - start).div_euclid(pitch) + 1) * pitch)
    };

    let polygons = region.to_polygons();
    let mut lines: Polylines = Vec::new();
    let mut positions = 0;
    let mut x = first;
    while x < bbox.max.x {
        let ys = crossings(&polygons, x);
        if ys.len() % 2 != 0 {
            return Err(Error::InfillFailed(format!(
                "scan line at x={} crosses the boundary {} times",
                x,
                ys.len()
            )));
        }
        for span in ys.chunks_exact(2) {
            if span[0] == span[1] {
                continue;
            }
            let mut line =
                Polyline::from_points(vec![Point::new(x, span[0]), Point::new(x, span[1])]);
            if lines.len() % 2 == 1 {
                line.reverse();
            }
            lines.push(line);
        }
        positions += 1;
        x += pitch;
    }

    if positions > 0 && lines.is_empty() {
        return Err(Error::InfillFailed(format!(
            "{positions} scan lines inside {bbox:?} produced no segment"
        )));
    }
    trace!("scan at {:.3} rad: {} positions, {} lines", angle, positions, lines.len());

    for line in &mut lines {
        line.rotate_around(angle, origin);
    }
    Ok((lines, pitch))
}

fn connect_lines(
    ctx: &FillContext<'_, '_>,
    lines: Polylines,
    expolygon: &ExPolygon,
    params: &FillParams,
) -> Polylines {
    if params.dont_connect() || lines.len() <= 1 {
        return lines;
    }
    connect_infill(lines, expolygon, ctx.state.spacing, ctx.state.link_max_length, params)
}

/// Single sweep along the fill direction. Full infill stretches the pitch to tile
/// the region and stores the result in `state.spacing`.
fn fill_single_sweep(
    ctx: &mut FillContext<'_, '_>,
    expolygon: &ExPolygon,
) -> Result<(Polylines, Coord)> {
    let solid = ctx.params.full_infill() && !ctx.params.dont_adjust;
    let (lines, pitch) = scan(
        expolygon,
        ctx.direction.angle,
        ctx.direction.origin,
        ctx.line_pitch(),
        0,
        solid,
    )?;
    if solid {
        ctx.state.spacing = unscale(pitch);
    }
    Ok((lines, pitch))
}

/// Several sweeps sharing the density. Each sweep is `sweeps.len()` times sparser.
fn fill_multilines(
    ctx: &mut FillContext<'_, '_>,
    expolygon: ExPolygon,
    sweeps: &[Sweep],
) -> Result<Polylines> {
    let n = sweeps.len() as CoordF;
    let pitch = (scale(ctx.state.spacing) as CoordF * n / ctx.params.density).round() as Coord;

    let mut lines = Vec::new();
    for sweep in sweeps {
        let (swept, _) = scan(
            &expolygon,
            ctx.direction.angle + sweep.angle,
            ctx.direction.origin,
            pitch,
            sweep.shift,
            false,
        )?;
        lines.extend(swept);
    }

    let lines = chain_polylines(lines);
    let params = ctx.params;
    Ok(connect_lines(ctx, lines, &expolygon, &params))
}

macro_rules! pattern_boilerplate {
    ($name:ident) => {
        fn pattern(&self) -> InfillPattern {
            InfillPattern::$name
        }

        fn clone_box(&self) -> Box<dyn FillPattern> {
            Box::new(*self)
        }
    };
}

// ============================================================================
// Single-sweep patterns
// ============================================================================

/// Parallel lines, turned 90° on every other layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rectilinear;

impl FillPattern for Rectilinear {
    pattern_boilerplate!(Rectilinear);

    fn is_self_crossing(&self) -> bool {
        false
    }

    fn has_consistent_pattern(&self) -> bool {
        true
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let (lines, _) = fill_single_sweep(ctx, &expolygon)?;
        let params = ctx.params;
        Ok(connect_lines(ctx, lines, &expolygon, &params))
    }
}

/// Rectilinear lines connected only where the path keeps advancing across them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monotonic;

impl FillPattern for Monotonic {
    pattern_boilerplate!(Monotonic);

    fn is_self_crossing(&self) -> bool {
        false
    }

    fn has_consistent_pattern(&self) -> bool {
        true
    }

    fn no_sort(&self) -> bool {
        true
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let (lines, _) = fill_single_sweep(ctx, &expolygon)?;
        let params = ctx.params.monotonic(true);
        Ok(connect_lines(ctx, lines, &expolygon, &params))
    }
}

/// Rectilinear lines for the base of support, linked along the island outlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportBase;

impl FillPattern for SupportBase {
    pattern_boilerplate!(SupportBase);

    fn is_self_crossing(&self) -> bool {
        false
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let (lines, pitch) = fill_single_sweep(ctx, &expolygon)?;
        if ctx.params.dont_connect() || lines.len() <= 1 {
            return Ok(lines);
        }
        let bbox = expolygon.bounding_box();
        Ok(connect_base_support(
            lines,
            &expolygon.to_polygons(),
            &bbox,
            unscale(pitch),
            &ctx.params,
        ))
    }
}

// ============================================================================
// Multi-sweep patterns
// ============================================================================

/// Two sweeps at right angles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grid;

impl FillPattern for Grid {
    pattern_boilerplate!(Grid);

    fn is_self_crossing(&self) -> bool {
        true
    }

    fn has_consistent_pattern(&self) -> bool {
        true
    }

    fn layer_angle(&self, _idx: usize) -> CoordF {
        0.0
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        fill_multilines(ctx, expolygon, &[Sweep::new(0.0, 0), Sweep::new(FRAC_PI_2, 0)])
    }
}

/// Three sweeps at 60°, all passing through common points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangles;

impl FillPattern for Triangles {
    pattern_boilerplate!(Triangles);

    fn is_self_crossing(&self) -> bool {
        true
    }

    fn has_consistent_pattern(&self) -> bool {
        true
    }

    fn layer_angle(&self, _idx: usize) -> CoordF {
        0.0
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        fill_multilines(
            ctx,
            expolygon,
            &[
                Sweep::new(0.0, 0),
                Sweep::new(FRAC_PI_3, 0),
                Sweep::new(2.0 * FRAC_PI_3, 0),
            ],
        )
    }
}

/// Triangles with the third sweep moved off the common points, leaving star shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stars;

impl FillPattern for Stars {
    pattern_boilerplate!(Stars);

    fn is_self_crossing(&self) -> bool {
        true
    }

    fn has_consistent_pattern(&self) -> bool {
        true
    }

    fn layer_angle(&self, _idx: usize) -> CoordF {
        0.0
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let shift = (1.5 * ctx.line_pitch() as CoordF).round() as Coord;
        fill_multilines(
            ctx,
            expolygon,
            &[
                Sweep::new(0.0, 0),
                Sweep::new(FRAC_PI_3, 0),
                Sweep::new(2.0 * FRAC_PI_3, shift),
            ],
        )
    }
}

/// Three sweeps whose phase moves with z, so stacked layers trace cubes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cubic;

impl FillPattern for Cubic {
    pattern_boilerplate!(Cubic);

    fn is_self_crossing(&self) -> bool {
        true
    }

    fn layer_angle(&self, _idx: usize) -> CoordF {
        0.0
    }

    fn fill_surface_single(
        &self,
        ctx: &mut FillContext<'_, '_>,
        expolygon: ExPolygon,
    ) -> Result<Polylines> {
        let dx = scale(ctx.state.z * FRAC_1_SQRT_2);
        fill_multilines(
            ctx,
            expolygon,
            &[
                Sweep::new(0.0, dx),
                Sweep::new(FRAC_PI_3, -dx),
                Sweep::new(2.0 * FRAC_PI_3, dx),
            ],
        )
    }
}
