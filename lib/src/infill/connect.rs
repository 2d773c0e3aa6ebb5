//! Boundary-aware infill line connection.
//!
//! Generators emit raw lines in scan order. The connector walks them pairwise and
//! joins the end of each line to the start of the next by following the region
//! boundary between the two points, so the extruder does not have to travel.
//!
//! # Rules
//!
//! - Both endpoints must lie on the same boundary contour. The link then runs
//!   along the shorter of the two arcs between them. On equal length the arc
//!   following the stored contour order wins (counter-clockwise around the
//!   outer contour, clockwise around holes).
//! - A link is refused when it is longer than `link_max_length` (0 = unlimited),
//!   when it passes over the endpoint of another line, or when it overlaps a
//!   stretch of boundary already used by an earlier link or anchor.
//! - In monotonic mode the link must keep advancing across the scan lines; the
//!   longer arc is tried when the shorter one would turn back, and the lines
//!   stay apart when neither qualifies.
//! - Free ends resting on the boundary are extended along it into anchors of up
//!   to `min(anchor_length, anchor_length_max)`, stopping short of occupied
//!   boundary. Monotonic fills and the support base get no anchors.
//!
//! Output is fully deterministic: every decision depends only on input order.

use super::FillParams;
use crate::geometry::{BoundingBox, ExPolygon, Point, PointF, Polygon, Polyline, Polylines};
use crate::{scale, unscale, Coord, CoordF};
use log::debug;

/// Endpoints farther than this from every contour are not attached to one.
const SNAP_TOLERANCE: CoordF = 2_000.0;

/// Slack when comparing positions along a contour.
const PARAM_EPSILON: CoordF = 10.0;

/// Slack of the monotonic progress check.
const MONOTONIC_EPSILON: CoordF = 10.0;

/// Links of the support base longer than this many line pitches are not made.
const BASE_SUPPORT_LINK_PITCHES: CoordF = 3.0;

// ============================================================================
// Boundary contours
// ============================================================================

/// A closed contour with the arc length at each vertex.
struct Contour {
    points: Vec<Point>,
    /// `params[i]` is the arc length from `points[0]` to `points[i]`; the last
    /// entry is the full perimeter.
    params: Vec<CoordF>,
}

impl Contour {
    fn new(polygon: &Polygon) -> Option<Self> {
        let points = polygon.points().to_vec();
        if points.len() < 3 {
            return None;
        }
        let mut params = Vec::with_capacity(points.len() + 1);
        let mut acc = 0.0;
        params.push(acc);
        for (i, p) in points.iter().enumerate() {
            acc += p.distance(&points[(i + 1) % points.len()]);
            params.push(acc);
        }
        (acc > 0.0).then_some(Self { points, params })
    }

    #[inline]
    fn length(&self) -> CoordF {
        self.params[self.points.len()]
    }

    /// Position and distance of the point of the contour closest to `p`.
    fn project(&self, p: &Point) -> (CoordF, CoordF) {
        let n = self.points.len();
        let mut best = (0.0, CoordF::MAX);
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let foot = p.project_onto_segment(&a, &b);
            let dist = p.distance(&foot);
            if dist < best.1 {
                best = (self.params[i] + a.distance(&foot), dist);
            }
        }
        best
    }

    /// Point at arc length `param`.
    fn point_at(&self, param: CoordF) -> Point {
        let param = param.rem_euclid(self.length());
        let n = self.points.len();
        let i = self.params.partition_point(|t| *t <= param).saturating_sub(1).min(n - 1);
        let a = self.points[i];
        let b = self.points[(i + 1) % n];
        let edge = self.params[i + 1] - self.params[i];
        if edge <= 0.0 {
            return a;
        }
        let t = (param - self.params[i]) / edge;
        Point::new(
            a.x + ((b.x - a.x) as CoordF * t).round() as Coord,
            a.y + ((b.y - a.y) as CoordF * t).round() as Coord,
        )
    }

    /// Distance from `from` to `to` walking in the given direction.
    #[inline]
    fn offset(&self, from: CoordF, to: CoordF, forward: bool) -> CoordF {
        if forward {
            (to - from).rem_euclid(self.length())
        } else {
            (from - to).rem_euclid(self.length())
        }
    }

    /// Vertices strictly inside the arc of length `len` starting at `from`, in
    /// walking order.
    fn arc_vertices(&self, from: CoordF, len: CoordF, forward: bool) -> Vec<Point> {
        let mut inner: Vec<(CoordF, Point)> = self
            .points
            .iter()
            .zip(&self.params)
            .map(|(p, t)| (self.offset(from, *t, forward), *p))
            .filter(|(d, _)| *d > PARAM_EPSILON && *d < len - PARAM_EPSILON)
            .collect();
        inner.sort_by(|a, b| a.0.total_cmp(&b.0));
        inner.into_iter().map(|(_, p)| p).collect()
    }
}

/// A stretch of a contour, stored as start and length in contour order.
#[derive(Debug, Clone, Copy)]
struct Interval {
    start: CoordF,
    len: CoordF,
}

impl Interval {
    fn new(contour: &Contour, from: CoordF, len: CoordF, forward: bool) -> Self {
        let start = if forward {
            from
        } else {
            (from - len).rem_euclid(contour.length())
        };
        Self { start, len }
    }

    fn contains(&self, contour: &Contour, param: CoordF) -> bool {
        let d = contour.offset(self.start, param, true);
        d > PARAM_EPSILON && d < self.len - PARAM_EPSILON
    }

    fn overlaps(&self, contour: &Contour, other: &Interval) -> bool {
        let d = contour.offset(self.start, other.start, true);
        d < self.len - PARAM_EPSILON || d + other.len - contour.length() > PARAM_EPSILON
    }

    fn end(&self) -> CoordF {
        self.start + self.len
    }
}

/// Where a line endpoint touches the boundary.
#[derive(Debug, Clone, Copy)]
struct Attachment {
    contour: usize,
    param: CoordF,
}

/// Attach `p` to the closest contour within the snap tolerance.
fn attach(contours: &[Contour], p: &Point) -> Option<Attachment> {
    let mut best: Option<(Attachment, CoordF)> = None;
    for (idx, contour) in contours.iter().enumerate() {
        let (param, dist) = contour.project(p);
        if dist <= SNAP_TOLERANCE && best.map_or(true, |(_, d)| dist < d) {
            best = Some((Attachment { contour: idx, param }, dist));
        }
    }
    best.map(|(a, _)| a)
}

// ============================================================================
// Connector
// ============================================================================

struct Connector<'c> {
    contours: &'c [Contour],
    /// Attachments of (start, end) of every input line.
    ends: Vec<[Option<Attachment>; 2]>,
    /// Boundary already taken by links and anchors, per contour.
    used: Vec<Vec<Interval>>,
    link_max_length: CoordF,
    params: FillParams,
}

struct Link {
    contour: usize,
    interval: Interval,
    points: Vec<Point>,
}

impl<'c> Connector<'c> {
    fn new(
        contours: &'c [Contour],
        lines: &[Polyline],
        link_max_length: Coord,
        params: FillParams,
    ) -> Self {
        let ends = lines
            .iter()
            .map(|l| {
                let pts = l.points();
                [
                    pts.first().and_then(|p| attach(contours, p)),
                    pts.last().and_then(|p| attach(contours, p)),
                ]
            })
            .collect();
        Self {
            contours,
            ends,
            used: vec![Vec::new(); contours.len()],
            link_max_length: link_max_length as CoordF,
            params,
        }
    }

    /// Endpoint ids are `2 * line + side`, side 0 = start, 1 = end.
    fn blocked_by_endpoint(&self, contour: usize, interval: &Interval, skip: [usize; 2]) -> bool {
        self.ends.iter().enumerate().any(|(line, sides)| {
            sides.iter().enumerate().any(|(side, att)| {
                let id = 2 * line + side;
                !skip.contains(&id)
                    && att.is_some_and(|a| {
                        a.contour == contour && interval.contains(&self.contours[contour], a.param)
                    })
            })
        })
    }

    fn blocked_by_used(&self, contour: usize, interval: &Interval) -> bool {
        let c = &self.contours[contour];
        self.used[contour].iter().any(|u| interval.overlaps(c, u))
    }

    /// Boundary link from the end of line `i` (at `from`, arriving along
    /// `arrival`) to the start of line `i + 1` (at `to`).
    fn find_link(&self, i: usize, from: Point, arrival: PointF, to: Point) -> Option<Link> {
        let a = self.ends[i][1]?;
        let b = self.ends[i + 1][0]?;
        if a.contour != b.contour {
            return None;
        }
        let contour = &self.contours[a.contour];
        let fwd = contour.offset(a.param, b.param, true);
        let bwd = contour.length() - fwd;
        let candidates = if bwd < fwd {
            [(false, bwd), (true, fwd)]
        } else {
            [(true, fwd), (false, bwd)]
        };
        let tries = if self.params.monotonic { 2 } else { 1 };

        for &(forward, len) in candidates.iter().take(tries) {
            if self.link_max_length > 0.0 && len > self.link_max_length {
                continue;
            }
            let interval = Interval::new(contour, a.param, len, forward);
            if self.blocked_by_endpoint(a.contour, &interval, [2 * i + 1, 2 * (i + 1)]) {
                continue;
            }
            if self.blocked_by_used(a.contour, &interval) {
                continue;
            }
            let points = contour.arc_vertices(a.param, len, forward);
            if self.params.monotonic && !advances(from, arrival, to, &points) {
                continue;
            }
            return Some(Link {
                contour: a.contour,
                interval,
                points,
            });
        }
        None
    }

    /// Room along the boundary from `at` before hitting an endpoint or used stretch.
    fn free_room(&self, at: Attachment, own_id: usize, forward: bool) -> CoordF {
        let contour = &self.contours[at.contour];
        if self.used[at.contour].iter().any(|u| u.contains(contour, at.param)) {
            return 0.0;
        }
        let endpoints = self.ends.iter().enumerate().flat_map(|(line, sides)| {
            sides.iter().enumerate().filter_map(move |(side, att)| {
                let att = (*att)?;
                (2 * line + side != own_id && att.contour == at.contour).then_some(att.param)
            })
        });
        let used_bounds = self.used[at.contour]
            .iter()
            .flat_map(|u| [u.start, u.end()]);

        endpoints
            .chain(used_bounds)
            .map(|t| contour.offset(at.param, t, forward))
            .filter(|d| *d > PARAM_EPSILON)
            .fold(contour.length(), CoordF::min)
    }

    /// Anchor for a free end: points walked along the boundary away from it.
    fn anchor(&mut self, at: Attachment, own_id: usize, gap: CoordF) -> Option<Vec<Point>> {
        let max_len = scale(self.params.effective_anchor_length()) as CoordF;
        let room_fwd = self.free_room(at, own_id, true);
        let room_bwd = self.free_room(at, own_id, false);
        let (forward, room) = if room_fwd >= room_bwd {
            (true, room_fwd)
        } else {
            (false, room_bwd)
        };

        let len = max_len.min(room - gap);
        if len <= gap * 0.2 {
            return None;
        }
        let contour = &self.contours[at.contour];
        let mut points = contour.arc_vertices(at.param, len, forward);
        let end = if forward { at.param + len } else { at.param - len };
        points.push(contour.point_at(end));
        self.used[at.contour].push(Interval::new(contour, at.param, len, forward));
        Some(points)
    }

    fn run(mut self, lines: Polylines, spacing: CoordF, anchors: bool) -> Polylines {
        let n = lines.len();
        // (polyline, first line, last line)
        let mut chains: Vec<(Polyline, usize, usize)> = Vec::new();
        let mut lines = lines.into_iter().enumerate();
        let Some((_, first)) = lines.next() else {
            return Vec::new();
        };
        let mut current = (first, 0, 0);
        let mut links = 0;

        for (j, line) in lines {
            let link = if current.0.len() >= 2 {
                let pts = current.0.points();
                let from = pts[pts.len() - 1];
                let prev = pts[pts.len() - 2];
                let arrival = (from - prev).to_f64().normalize();
                self.find_link(j - 1, from, arrival, line.first_point())
            } else {
                None
            };
            match link {
                Some(link) => {
                    self.used[link.contour].push(link.interval);
                    current.0.points_mut().extend(link.points);
                    current.0.append(&line);
                    current.2 = j;
                    links += 1;
                }
                None => {
                    chains.push(current);
                    current = (line, j, j);
                }
            }
        }
        chains.push(current);

        if anchors && !self.params.monotonic && self.params.effective_anchor_length() > 0.0 {
            let gap = 0.5 * scale(spacing) as CoordF;
            for (polyline, first, last) in chains.iter_mut() {
                if let Some(at) = self.ends[*first][0] {
                    if let Some(mut pts) = self.anchor(at, 2 * *first, gap) {
                        pts.reverse();
                        pts.extend_from_slice(polyline.points());
                        *polyline = Polyline::from_points(pts);
                    }
                }
                if let Some(at) = self.ends[*last][1] {
                    if let Some(pts) = self.anchor(at, 2 * *last + 1, gap) {
                        polyline.points_mut().extend(pts);
                    }
                }
            }
        }

        debug!("connected {} lines into {} paths ({} links)", n, chains.len(), links);
        chains.into_iter().map(|(pl, _, _)| pl).collect()
    }
}

/// Whether the path `from` -> `points` -> `to` never moves back across the scan
/// lines. The scan axis is perpendicular to `arrival`, oriented toward `to`.
fn advances(from: Point, arrival: PointF, to: Point, points: &[Point]) -> bool {
    let delta = (to - from).to_f64();
    let mut axis = if arrival.length() > 0.0 {
        arrival.perp()
    } else {
        delta.normalize()
    };
    if axis.dot(&delta) < 0.0 {
        axis = axis * -1.0;
    }
    let project = |p: &Point| axis.dot(&(*p - from).to_f64());
    let mut last = 0.0;
    for p in points.iter().chain(std::iter::once(&to)) {
        let d = project(p);
        // Projections are in mm; the slack is in scaled units.
        if d < last - unscale(MONOTONIC_EPSILON as Coord) {
            return false;
        }
        last = last.max(d);
    }
    true
}

fn connect(
    lines: Polylines,
    contours: &[Contour],
    spacing: CoordF,
    link_max_length: Coord,
    params: &FillParams,
    anchors: bool,
) -> Polylines {
    if lines.is_empty() || params.dont_connect() {
        return lines;
    }
    Connector::new(contours, &lines, link_max_length, *params).run(lines, spacing, anchors)
}

fn contours_near(boundary: &[Polygon], bbox: &BoundingBox, margin: Coord) -> Vec<Contour> {
    let area = bbox.expanded(margin);
    boundary
        .iter()
        .filter(|p| p.bounding_box().overlaps(&area))
        .filter_map(Contour::new)
        .collect()
}

// ============================================================================
// Public entry points
// ============================================================================

/// Connect infill lines along the boundary of one region.
///
/// # Arguments
/// * `lines` - Raw lines in scan order
/// * `boundary` - The region the lines were clipped to
/// * `spacing` - Line width (mm)
/// * `link_max_length` - Longest allowed link (scaled), 0 = unlimited
/// * `params` - Fill parameters (anchors, monotonic)
pub fn connect_infill(
    lines: Polylines,
    boundary: &ExPolygon,
    spacing: CoordF,
    link_max_length: Coord,
    params: &FillParams,
) -> Polylines {
    let contours: Vec<Contour> = std::iter::once(&boundary.contour)
        .chain(boundary.holes.iter())
        .filter_map(Contour::new)
        .collect();
    connect(lines, &contours, spacing, link_max_length, params, true)
}

/// Connect infill lines along a set of boundary polygons.
///
/// Only polygons touching `bbox` (grown by one line width) take part.
///
/// # Panics
/// When `bbox` is undefined.
pub fn connect_infill_polygons(
    lines: Polylines,
    boundary: &[Polygon],
    bbox: &BoundingBox,
    spacing: CoordF,
    link_max_length: Coord,
    params: &FillParams,
) -> Polylines {
    assert!(bbox.is_defined(), "connect_infill_polygons needs a bounding box");
    let contours = contours_near(boundary, bbox, scale(spacing));
    connect(lines, &contours, spacing, link_max_length, params, true)
}

/// Connect support base lines along their boundary polygons.
///
/// Same rule as [`connect_infill_polygons`], without anchors. `spacing` is the
/// distance between neighbouring lines (mm); links longer than three of those
/// are not made.
///
/// # Panics
/// When `bbox` is undefined.
pub fn connect_base_support(
    lines: Polylines,
    boundary: &[Polygon],
    bbox: &BoundingBox,
    spacing: CoordF,
    params: &FillParams,
) -> Polylines {
    assert!(bbox.is_defined(), "connect_base_support needs a bounding box");
    let contours = contours_near(boundary, bbox, scale(spacing));
    let link_max_length = scale(BASE_SUPPORT_LINK_PITCHES * spacing);
    connect(lines, &contours, spacing, link_max_length, params, false)
}

/// Order polylines greedily so that each starts near where the previous ended.
///
/// Starts with the first polyline; ties go to the lower index, and to the
/// start point over the end point.
pub fn chain_polylines(polylines: Polylines) -> Polylines {
    if polylines.len() <= 1 {
        return polylines;
    }
    let mut remaining: Vec<Option<Polyline>> = polylines.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(remaining.len());
    let mut last = match remaining[0].take() {
        Some(first) => {
            let end = first.last_point();
            out.push(first);
            end
        }
        None => return out,
    };

    loop {
        let mut best: Option<(usize, bool, i128)> = None;
        for (idx, pl) in remaining.iter().enumerate() {
            let Some(pl) = pl else { continue };
            if pl.is_empty() {
                continue;
            }
            let d_start = last.distance_squared(&pl.first_point());
            let d_end = last.distance_squared(&pl.last_point());
            let (reverse, d) = if d_end < d_start { (true, d_end) } else { (false, d_start) };
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((idx, reverse, d));
            }
        }
        let Some((idx, reverse, _)) = best else { break };
        if let Some(mut pl) = remaining[idx].take() {
            if reverse {
                pl.reverse();
            }
            last = pl.last_point();
            out.push(pl);
        }
    }
    out.extend(remaining.into_iter().flatten());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: CoordF) -> ExPolygon {
        ExPolygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(size, size))
    }

    fn line(a: (CoordF, CoordF), b: (CoordF, CoordF)) -> Polyline {
        Polyline::from_points(vec![Point::new_scale(a.0, a.1), Point::new_scale(b.0, b.1)])
    }

    /// Vertical boustrophedon lines across a 10 mm square.
    fn zigzag_lines() -> Polylines {
        vec![
            line((2.0, 0.0), (2.0, 10.0)),
            line((4.0, 10.0), (4.0, 0.0)),
            line((6.0, 0.0), (6.0, 10.0)),
            line((8.0, 10.0), (8.0, 0.0)),
        ]
    }

    fn no_anchors() -> FillParams {
        FillParams::with_density(0.2).anchors(0.0, 1000.0)
    }

    #[test]
    fn test_connects_adjacent_lines() {
        let out = connect_infill(zigzag_lines(), &square(10.0), 0.45, 0, &no_anchors());
        assert_eq!(out.len(), 1);
        let pts = out[0].points();
        assert_eq!(pts.len(), 8);
        assert_eq!(pts[0], Point::new_scale(2.0, 0.0));
        assert_eq!(pts[7], Point::new_scale(8.0, 0.0));
    }

    #[test]
    fn test_dont_connect_passes_lines_through() {
        let params = FillParams::with_density(0.2).anchors(0.0, 0.02);
        let out = connect_infill(zigzag_lines(), &square(10.0), 0.45, 0, &params);
        assert_eq!(out, zigzag_lines());
    }

    #[test]
    fn test_link_max_length_splits() {
        let params = no_anchors();
        let out = connect_infill(zigzag_lines(), &square(10.0), 0.45, scale(1.5), &params);
        assert_eq!(out.len(), 4);

        // complete never makes links the limit rejects
        let complete = params.complete(true);
        let out = connect_infill(zigzag_lines(), &square(10.0), 0.45, scale(1.5), &complete);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_equal_arcs_follow_contour_order() {
        // Both arcs from (5, 0) to (5, 10) are 20 mm long.
        let lines = vec![line((5.0, 5.0), (5.0, 0.0)), line((5.0, 10.0), (5.0, 6.0))];
        let out = connect_infill(lines.clone(), &square(10.0), 0.45, 0, &no_anchors());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points()[2], Point::new_scale(10.0, 0.0));
        assert_eq!(out[0].points()[3], Point::new_scale(10.0, 10.0));

        // Same geometry walked the other way: the counter-clockwise arc now
        // passes the left side.
        let lines = vec![line((5.0, 6.0), (5.0, 10.0)), line((5.0, 0.0), (5.0, 5.0))];
        let out = connect_infill(lines, &square(10.0), 0.45, 0, &no_anchors());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].points()[2], Point::new_scale(0.0, 10.0));
        assert_eq!(out[0].points()[3], Point::new_scale(0.0, 0.0));
    }

    #[test]
    fn test_link_never_passes_other_endpoint() {
        // The short arc from (2, 10) to (6, 10) would run over (4, 10).
        let lines = vec![
            line((2.0, 0.0), (2.0, 10.0)),
            line((6.0, 10.0), (6.0, 0.0)),
            line((4.0, 10.0), (4.0, 5.0)),
        ];
        let out = connect_infill(lines, &square(10.0), 0.45, 0, &no_anchors());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_endpoints_on_different_contours_stay_apart() {
        let mut hole = Polygon::rectangle(Point::new_scale(4.0, 4.0), Point::new_scale(6.0, 6.0));
        hole.reverse();
        let region = ExPolygon::with_holes(square(10.0).contour, vec![hole]);
        // The first line ends on the hole, the second starts on the outer contour.
        let lines = vec![line((5.0, 0.0), (5.0, 4.0)), line((5.0, 10.0), (5.0, 6.0))];
        let out = connect_infill(lines, &region, 0.45, 0, &no_anchors());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_monotonic_link_keeps_advancing() {
        let params = no_anchors().monotonic(true);
        let out = connect_infill(zigzag_lines(), &square(10.0), 0.45, 0, &params);
        assert_eq!(out.len(), 1);
        let xs: Vec<Coord> = out[0].points().iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]), "{xs:?}");
    }

    #[test]
    fn test_anchors_extend_free_ends_along_boundary() {
        let lines = vec![line((2.0, 0.0), (2.0, 10.0)), line((4.0, 10.0), (4.0, 0.0))];
        let params = FillParams::with_density(0.2).anchors(1.0, 1000.0);
        let out = connect_infill(lines, &square(10.0), 0.45, 0, &params);
        assert_eq!(out.len(), 1);
        let pts = out[0].points();
        // 1 mm anchors at both ends, walking away from the neighbour line.
        assert_eq!(pts[0], Point::new_scale(1.0, 0.0));
        assert_eq!(pts[pts.len() - 1], Point::new_scale(5.0, 0.0));
    }

    #[test]
    fn test_anchors_disabled_for_base_support() {
        let region = square(10.0);
        let bbox = region.bounding_box();
        let params = FillParams::with_density(0.2).anchors(1.0, 1000.0);
        let out = connect_base_support(zigzag_lines(), &region.to_polygons(), &bbox, 2.0, &params);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].first_point(), Point::new_scale(2.0, 0.0));
        assert_eq!(out[0].last_point(), Point::new_scale(8.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "needs a bounding box")]
    fn test_polygons_variant_requires_bbox() {
        let region = square(10.0);
        connect_infill_polygons(
            zigzag_lines(),
            &region.to_polygons(),
            &BoundingBox::new(),
            0.45,
            0,
            &no_anchors(),
        );
    }

    #[test]
    fn test_connect_is_deterministic() {
        let region = square(10.0);
        let params = FillParams::with_density(0.2);
        let a = connect_infill(zigzag_lines(), &region, 0.45, 0, &params);
        let b = connect_infill(zigzag_lines(), &region, 0.45, 0, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_chain_polylines_nearest_first() {
        let lines = vec![
            line((0.0, 0.0), (0.0, 1.0)),
            line((5.0, 5.0), (6.0, 5.0)),
            line((0.5, 3.0), (0.5, 1.2)),
        ];
        let out = chain_polylines(lines);
        assert_eq!(out[1].first_point(), Point::new_scale(0.5, 1.2));
        assert_eq!(out[2].first_point(), Point::new_scale(5.0, 5.0));
    }
}
