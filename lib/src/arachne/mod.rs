//! Arachne variable-width path generation.
//!
//! Produces concentric centerline loops whose extrusion width follows the local
//! thickness of the region, so that narrow leftovers between loops are filled by
//! widening the innermost bead instead of leaving a gap.
//!
//! # Overview
//!
//! 1. Loop `k` runs along the inset of the region by `(k + 0.5)` bead widths
//! 2. Every loop is printed at the nominal bead width
//! 3. The innermost loop is resampled, measures the region left inside it along
//!    its inward normal and widens (moving its centerline inward by half the
//!    extra width)
//! 4. Width changes are ramped and clamped by [`beading::Beading`]
//!
//! A region too thin for even one nominal bead still gets a single loop when it
//! is at least one minimum bead wide.

pub mod beading;

pub use beading::Beading;

use crate::clipper::{shrink, OffsetJoinType};
use crate::config::{PrintConfig, PrintObjectConfig};
use crate::geometry::{ExPolygon, Line, Point, PointF, Polygon, ThickPolyline};
use crate::{unscale, Coord, CoordF};
use log::debug;
use serde::{Deserialize, Serialize};

/// Ray hits closer than this (scaled) are the same crossing.
const HIT_EPSILON: CoordF = 10.0;

/// Bead parameters for one variable-width fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArachneParams {
    /// Nominal bead width (mm).
    pub bead_width: CoordF,
    /// Narrowest bead that is still printed (mm).
    pub min_bead_width: CoordF,
    /// Leftover gaps narrower than this are not filled (mm).
    pub min_feature_size: CoordF,
    /// Length over which a bead ramps up to its widened width (mm).
    pub wall_transition_length: CoordF,
    /// Corners sharper than this are not widened (degrees).
    pub wall_transition_angle: CoordF,
    /// Layer height the paths are printed at (mm).
    pub layer_height: CoordF,
}

impl Default for ArachneParams {
    fn default() -> Self {
        let object = PrintObjectConfig::default();
        let print = PrintConfig::default();
        Self {
            bead_width: print.solid_infill_width(),
            min_bead_width: object.arachne_min_bead_width,
            min_feature_size: object.arachne_min_feature_size,
            wall_transition_length: object.arachne_wall_transition_length,
            wall_transition_angle: object.arachne_wall_transition_angle,
            layer_height: print.layer_height,
        }
    }
}

impl ArachneParams {
    /// Build from the fill spacing and the optional print settings.
    ///
    /// A non-positive `spacing` or `layer_height` falls back to the print
    /// configuration; missing configurations fall back to their defaults.
    pub fn new(
        spacing: CoordF,
        layer_height: CoordF,
        print_config: Option<&PrintConfig>,
        object_config: Option<&PrintObjectConfig>,
    ) -> Self {
        let print = print_config.cloned().unwrap_or_default();
        let object = object_config.cloned().unwrap_or_default();
        Self {
            bead_width: if spacing > 0.0 { spacing } else { print.solid_infill_width() },
            min_bead_width: object.arachne_min_bead_width,
            min_feature_size: object.arachne_min_feature_size,
            wall_transition_length: object.arachne_wall_transition_length,
            wall_transition_angle: object.arachne_wall_transition_angle,
            layer_height: if layer_height > 0.0 { layer_height } else { print.layer_height },
        }
    }
}

/// A closed centerline loop with one width per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableWidthLoop {
    pub points: Vec<Point>,
    pub widths: Vec<Coord>,
    /// 0 for the outermost loop, increasing inward.
    pub inset_idx: usize,
}

impl VariableWidthLoop {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Open the loop at `index`; the path ends back on its start point.
    pub fn split_at_index(&self, index: usize) -> ThickPolyline {
        let mut out = ThickPolyline::new();
        let n = self.points.len();
        if n == 0 {
            return out;
        }
        for k in 0..=n {
            let i = (index + k) % n;
            out.push(self.points[i], self.widths[i]);
        }
        out
    }

    /// Thinnest and widest bead on the loop.
    pub fn width_range(&self) -> Option<(Coord, Coord)> {
        let min = self.widths.iter().copied().min()?;
        let max = self.widths.iter().copied().max()?;
        Some((min, max))
    }
}

/// Variable-width loop generator.
pub struct ArachneGenerator {
    params: ArachneParams,
    beading: Beading,
}

impl ArachneGenerator {
    pub fn new(params: ArachneParams) -> Self {
        Self {
            beading: Beading::new(&params),
            params,
        }
    }

    pub fn params(&self) -> &ArachneParams {
        &self.params
    }

    /// Generate loops for `region`, outermost first.
    pub fn generate(&self, region: &ExPolygon) -> Vec<VariableWidthLoop> {
        let bead = self.params.bead_width;
        let source = [region.clone()];
        let mut loops = Vec::new();

        let mut level = shrink(&source, 0.5 * bead, OffsetJoinType::Miter);
        let mut inset_idx = 0;
        while !level.is_empty() {
            let next = shrink(&source, bead * (inset_idx as CoordF + 1.5), OffsetJoinType::Miter);
            let remainder = if next.is_empty() {
                shrink(&source, bead * (inset_idx as CoordF + 1.0), OffsetJoinType::Miter)
            } else {
                Vec::new()
            };

            for ex in &level {
                for polygon in std::iter::once(&ex.contour).chain(ex.holes.iter()) {
                    if polygon.len() < 3 {
                        continue;
                    }
                    let lp = if next.is_empty() {
                        self.widened_loop(polygon, &remainder, inset_idx)
                    } else {
                        self.nominal_loop(polygon, inset_idx)
                    };
                    loops.push(lp);
                }
            }

            inset_idx += 1;
            level = next;
        }

        if loops.is_empty() {
            loops = self.thin_loops(&source);
        }

        debug!(
            "arachne: {} loops, bead {:.3}mm, layer height {:.3}mm",
            loops.len(),
            bead,
            self.params.layer_height
        );
        loops
    }

    fn nominal_loop(&self, polygon: &Polygon, inset_idx: usize) -> VariableWidthLoop {
        VariableWidthLoop {
            points: polygon.points().to_vec(),
            widths: vec![self.beading.nominal(); polygon.len()],
            inset_idx,
        }
    }

    /// A single loop for a region narrower than one nominal bead.
    fn thin_loops(&self, source: &[ExPolygon]) -> Vec<VariableWidthLoop> {
        let min_width = self.beading.min_width();
        let inset = 0.5 * unscale(min_width);
        shrink(source, inset, OffsetJoinType::Miter)
            .iter()
            .flat_map(|ex| std::iter::once(&ex.contour).chain(ex.holes.iter()))
            .filter(|p| p.len() >= 3)
            .map(|p| VariableWidthLoop {
                points: p.points().to_vec(),
                widths: vec![min_width; p.len()],
                inset_idx: 0,
            })
            .collect()
    }

    /// Innermost loop: widen each point by the chord of `remainder` along its
    /// inward normal and move it inward by half of that.
    fn widened_loop(
        &self,
        polygon: &Polygon,
        remainder: &[ExPolygon],
        inset_idx: usize,
    ) -> VariableWidthLoop {
        let resampled = densify(polygon.points(), 0.5 * self.beading.nominal() as CoordF);
        let pts = resampled.as_slice();
        let n = pts.len();
        let edges: Vec<Line> = remainder
            .iter()
            .flat_map(|ex| std::iter::once(&ex.contour).chain(ex.holes.iter()))
            .flat_map(Polygon::lines)
            .collect();

        let mut normals = Vec::with_capacity(n);
        let mut widths = Vec::with_capacity(n);
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            let d_in = (cur - prev).to_f64().normalize();
            let d_out = (next - cur).to_f64().normalize();
            // The region lies on the left of every canonical boundary.
            let normal = (d_in + d_out).normalize().perp();
            normals.push(normal);

            let turn = (d_in.x * d_out.y - d_in.y * d_out.x).atan2(d_in.dot(&d_out));
            let interior = std::f64::consts::PI - turn;
            let width = if normal.length() > 0.0 && self.beading.widens_corner(interior) {
                self.beading.widened(chord(&edges, cur, normal))
            } else {
                self.beading.nominal()
            };
            widths.push(width);
        }

        self.beading.limit_transitions(pts, &mut widths);

        let points = pts
            .iter()
            .zip(&normals)
            .zip(widths.iter_mut())
            .map(|((p, normal), w)| {
                *w = self.beading.clamp(*w);
                let shift = 0.5 * (*w - self.beading.nominal()).max(0) as CoordF;
                Point::new(
                    p.x + (normal.x * shift).round() as Coord,
                    p.y + (normal.y * shift).round() as Coord,
                )
            })
            .collect();

        VariableWidthLoop {
            points,
            widths,
            inset_idx,
        }
    }
}

/// Length of the first span of the region bounded by `edges` that a ray from
/// `origin` along `dir` passes through (scaled), 0 when it misses.
fn chord(edges: &[Line], origin: Point, dir: PointF) -> CoordF {
    let o = PointF::new(origin.x as CoordF, origin.y as CoordF);
    let mut hits: Vec<CoordF> = edges.iter().filter_map(|e| e.ray_hit(o, dir)).collect();
    if hits.len() < 2 {
        return 0.0;
    }
    hits.sort_by(|a, b| a.total_cmp(b));
    // a ray through a vertex hits both of its edges
    hits.dedup_by(|a, b| (*a - *b).abs() < HIT_EPSILON);
    if hits.len() < 2 {
        return 0.0;
    }
    hits[1] - hits[0]
}

/// Insert points on a closed loop so that no edge is longer than `max_step`.
fn densify(points: &[Point], max_step: CoordF) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % n];
        out.push(*a);
        let steps = (a.distance(&b) / max_step.max(1.0)).ceil() as usize;
        for k in 1..steps {
            let t = k as CoordF / steps as CoordF;
            out.push(Point::new(
                a.x + ((b.x - a.x) as CoordF * t).round() as Coord,
                a.y + ((b.y - a.y) as CoordF * t).round() as Coord,
            ));
        }
    }
    out
}

/// Variable-width loops for `region`, outermost first.
pub fn generate_loops(region: &ExPolygon, params: &ArachneParams) -> Vec<VariableWidthLoop> {
    ArachneGenerator::new(*params).generate(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale;

    fn rect(w: CoordF, h: CoordF) -> ExPolygon {
        ExPolygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(w, h))
    }

    fn params(bead: CoordF) -> ArachneParams {
        ArachneParams {
            bead_width: bead,
            ..ArachneParams::default()
        }
    }

    #[test]
    fn test_params_from_configs() {
        let object = PrintObjectConfig::new().arachne_min_bead_width(0.2);
        let p = ArachneParams::new(0.5, 0.0, None, Some(&object));
        assert_eq!(p.bead_width, 0.5);
        assert_eq!(p.min_bead_width, 0.2);
        assert_eq!(p.layer_height, PrintConfig::default().layer_height);

        let print = PrintConfig::new().solid_infill_extrusion_width(0.6);
        let p = ArachneParams::new(0.0, 0.3, Some(&print), None);
        assert_eq!(p.bead_width, 0.6);
        assert_eq!(p.layer_height, 0.3);
    }

    #[test]
    fn test_whole_number_of_beads_stays_nominal() {
        // 4 mm wide strip: exactly 10 beads of 0.4 mm across
        let loops = generate_loops(&rect(20.0, 4.0), &params(0.4));
        assert!(!loops.is_empty());
        for lp in &loops {
            let (min, max) = lp.width_range().unwrap();
            assert_eq!(min, scale(0.4));
            assert!(max <= scale(0.5), "loop {} max {}", lp.inset_idx, max);
        }
    }

    #[test]
    fn test_leftover_widens_innermost_loop() {
        // 1.0 mm strip with 0.4 mm beads: one loop, 0.2 mm left in the middle
        let loops = generate_loops(&rect(20.0, 1.0), &params(0.4));
        assert_eq!(loops.len(), 1);
        let (_, max) = loops[0].width_range().unwrap();
        assert!(max >= scale(0.49) && max <= scale(0.8), "max width {max}");
        // along the long sides each bead takes half of the gap
        let half_gap = loops[0].widths.iter().filter(|w| (**w - scale(0.5)).abs() < 1_000).count();
        assert!(half_gap > loops[0].len() / 2);
    }

    #[test]
    fn test_thin_region_gets_min_bead_loop() {
        let loops = generate_loops(&rect(20.0, 0.3), &params(0.4));
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].width_range(), Some((scale(0.1), scale(0.1))));
    }

    #[test]
    fn test_split_repeats_start() {
        let lp = VariableWidthLoop {
            points: vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)],
            widths: vec![1, 2, 3],
            inset_idx: 0,
        };
        let open = lp.split_at_index(1);
        assert_eq!(
            open.points(),
            &[Point::new(10, 0), Point::new(10, 10), Point::new(0, 0), Point::new(10, 0)]
        );
        assert_eq!(open.widths(), &[2, 3, 1, 2]);
    }

    #[test]
    fn test_densify_limits_edge_length() {
        let square = rect(1.0, 1.0);
        let pts = densify(square.contour.points(), scale(0.3) as CoordF);
        assert_eq!(pts.len(), 16);
        assert_eq!(pts[0], Point::new_scale(0.0, 0.0));
        assert_eq!(pts[4], Point::new_scale(1.0, 0.0));
    }

    #[test]
    fn test_chord_through_strip() {
        let edges = rect(10.0, 2.0).contour.lines();
        let len = chord(&edges, Point::new_scale(5.0, -1.0), PointF::new(0.0, 1.0));
        assert!((len - scale(2.0) as CoordF).abs() < 1.0);
    }
}
