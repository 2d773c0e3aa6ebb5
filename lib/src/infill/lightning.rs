//! Lightning infill.
//!
//! A sparse tree per layer: support points on a staggered world grid inside the
//! region, each joined by a straight branch to the nearest point of the
//! boundary or to a support point already in the tree. Points close to the
//! boundary are attached first so the branches grow inward.

use super::{FillContext, FillPattern, InfillPattern};
use crate::clipper::intersection_pl;
use crate::geometry::{align_to_grid, ExPolygon, Point, Polyline, Polylines};
use crate::{scale, Coord, CoordF, Result};
use log::debug;
use std::collections::VecDeque;

/// Branch ends closer than this are joined into one polyline.
const JOIN_TOLERANCE: Coord = 10_000;

/// Tree branches holding up the layers above.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lightning;

impl FillPattern for Lightning {
    fn pattern(&self) -> InfillPattern {
        InfillPattern::Lightning
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
        let grid = 2 * ctx.line_pitch();
        let sample_step = scale(ctx.state.spacing);
        let layer = ctx.state.layer_id.unwrap_or(0);

        let branches = grow_branches(&expolygon, grid, sample_step, layer);
        let out = chain_segments(&branches);
        debug!(
            "lightning: {} branches in {} paths, layer {layer}",
            branches.len(),
            out.len()
        );
        Ok(out)
    }
}

/// Points of a staggered grid with cell `grid` strictly inside `expolygon`.
///
/// The grid is anchored at the world origin and shifted by a quarter cell per
/// layer, cycling every four layers. Odd rows are offset by half a cell.
pub(crate) fn support_points(expolygon: &ExPolygon, grid: Coord, layer: usize) -> Vec<Point> {
    let bbox = expolygon.bounding_box();
    if grid <= 0 || !bbox.is_defined() {
        return Vec::new();
    }
    let phase = (layer % 4) as Coord * (grid / 4);
    let origin = align_to_grid(bbox.min, Point::new(grid, grid));

    let mut points = Vec::new();
    let mut y = origin.y + phase;
    while y <= bbox.max.y {
        let stagger = if (y - phase).div_euclid(grid) & 1 == 1 {
            grid / 2
        } else {
            0
        };
        let mut x = origin.x + phase + stagger;
        while x <= bbox.max.x {
            let p = Point::new(x, y);
            if x >= bbox.min.x && y >= bbox.min.y && expolygon.contains_point(&p) {
                points.push(p);
            }
            x += grid;
        }
        y += grid;
    }
    points
}

/// Points every `step` along the contour and the holes.
fn boundary_samples(expolygon: &ExPolygon, step: Coord) -> Vec<Point> {
    let step = step.max(1) as CoordF;
    let mut samples = Vec::new();
    for polygon in std::iter::once(&expolygon.contour).chain(&expolygon.holes) {
        for line in polygon.lines() {
            let len = line.length();
            if len < 1.0 {
                continue;
            }
            let n = (len / step).ceil() as usize;
            let d = line.b - line.a;
            for s in 0..n {
                let t = s as CoordF / n as CoordF;
                samples.push(Point::new(
                    line.a.x + (d.x as CoordF * t).round() as Coord,
                    line.a.y + (d.y as CoordF * t).round() as Coord,
                ));
            }
        }
    }
    samples
}

fn nearest(points: &[Point], p: &Point) -> Option<(Point, CoordF)> {
    p.nearest_point_index(points)
        .map(|idx| (points[idx], points[idx].distance(p)))
}

/// Whether the straight branch `a`-`b` lies entirely within `expolygon`.
fn stays_inside(a: Point, b: Point, expolygon: &ExPolygon) -> bool {
    let clipped = intersection_pl(
        &[Polyline::from_points(vec![a, b])],
        std::slice::from_ref(expolygon),
    );
    clipped.len() == 1 && clipped[0].length() >= a.distance(&b) - 10.0
}

/// Branch segments `(source, support point)` for one island.
pub(crate) fn grow_branches(
    expolygon: &ExPolygon,
    grid: Coord,
    sample_step: Coord,
    layer: usize,
) -> Vec<(Point, Point)> {
    let supports = support_points(expolygon, grid, layer);
    let samples = boundary_samples(expolygon, sample_step);
    if supports.is_empty() || samples.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<(i128, usize)> = supports
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let d = samples
                .iter()
                .map(|s| s.distance_squared(p))
                .min()
                .unwrap_or(i128::MAX);
            (d, i)
        })
        .collect();
    order.sort_unstable();

    let mut nodes: Vec<Point> = Vec::new();
    let mut branches = Vec::new();
    for (_, idx) in order {
        let target = supports[idx];
        let Some((to_boundary, boundary_dist)) = nearest(&samples, &target) else {
            continue;
        };
        // an existing branch wins unless the boundary is clearly closer
        let candidates = match nearest(&nodes, &target) {
            Some((node, node_dist)) if node_dist <= boundary_dist + 0.5 * grid as CoordF => {
                [Some(node), Some(to_boundary)]
            }
            Some((node, _)) => [Some(to_boundary), Some(node)],
            None => [Some(to_boundary), None],
        };
        if let Some(source) = candidates
            .into_iter()
            .flatten()
            .find(|source| stays_inside(*source, target, expolygon))
        {
            branches.push((source, target));
            nodes.push(target);
        }
    }
    branches
}

/// Join segments sharing end points into polylines.
pub(crate) fn chain_segments(segments: &[(Point, Point)]) -> Polylines {
    let mut used = vec![false; segments.len()];
    let mut out = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain: VecDeque<Point> = VecDeque::from([segments[start].0, segments[start].1]);

        for forward in [true, false] {
            loop {
                let end = if forward { chain.back() } else { chain.front() };
                let Some(end) = end.copied() else {
                    break;
                };
                let next = segments.iter().enumerate().find_map(|(i, (a, b))| {
                    if used[i] {
                        None
                    } else if end.coincides_with(a, JOIN_TOLERANCE) {
                        Some((i, *b))
                    } else if end.coincides_with(b, JOIN_TOLERANCE) {
                        Some((i, *a))
                    } else {
                        None
                    }
                });
                let Some((i, p)) = next else {
                    break;
                };
                used[i] = true;
                if forward {
                    chain.push_back(p);
                } else {
                    chain.push_front(p);
                }
            }
        }
        out.push(Polyline::from_points(chain.into_iter().collect()));
    }
    out
}
