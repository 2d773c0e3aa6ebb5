//! Path simplification.
//!
//! Douglas-Peucker reduction used to bring generated toolpaths down to the
//! requested fill resolution.

use super::{Line, Point, Polyline, ThickPolyline};
use crate::{scale, CoordF};

/// Indices of the points kept by Douglas-Peucker at `tolerance` (mm).
/// The first and last points are always kept.
fn douglas_peucker_keep(points: &[Point], tolerance: CoordF) -> Vec<bool> {
    let mut keep = vec![false; points.len()];
    if points.len() <= 2 {
        keep.iter_mut().for_each(|k| *k = true);
        return keep;
    }

    let tolerance = scale(tolerance) as f64;
    let tolerance_sq = tolerance * tolerance;
    keep[0] = true;
    keep[points.len() - 1] = true;

    // Stack-based implementation (avoids stack overflow for large inputs)
    let mut stack = vec![(0, points.len() - 1)];
    while let Some((anchor_idx, floater_idx)) = stack.pop() {
        if anchor_idx + 1 >= floater_idx {
            continue;
        }
        let chord = Line::new(points[anchor_idx], points[floater_idx]);

        let mut max_dist_sq = 0.0;
        let mut furthest_idx = anchor_idx;
        for (i, p) in points.iter().enumerate().take(floater_idx).skip(anchor_idx + 1) {
            let proj = chord.project_point(p);
            let dist_sq = p.distance_squared(&proj) as f64;
            if dist_sq > max_dist_sq {
                max_dist_sq = dist_sq;
                furthest_idx = i;
            }
        }

        if max_dist_sq > tolerance_sq {
            keep[furthest_idx] = true;
            stack.push((anchor_idx, furthest_idx));
            stack.push((furthest_idx, floater_idx));
        }
    }
    keep
}

/// Douglas-Peucker line simplification.
///
/// # Arguments
/// * `points` - The input points to simplify
/// * `tolerance` - Maximum distance a point can deviate from the simplified path (in mm)
pub fn douglas_peucker(points: &[Point], tolerance: CoordF) -> Vec<Point> {
    douglas_peucker_keep(points, tolerance)
        .into_iter()
        .zip(points)
        .filter_map(|(keep, p)| keep.then_some(*p))
        .collect()
}

/// Douglas-Peucker simplification for a polyline.
pub fn douglas_peucker_polyline(polyline: &Polyline, tolerance: CoordF) -> Polyline {
    Polyline::from_points(douglas_peucker(polyline.points(), tolerance))
}

/// Douglas-Peucker simplification for a thick polyline. A point is also kept when
/// its width moved more than `tolerance` away from the last kept width.
pub fn douglas_peucker_thick(polyline: &ThickPolyline, tolerance: CoordF) -> ThickPolyline {
    let keep = douglas_peucker_keep(polyline.points(), tolerance);
    let width_tolerance = scale(tolerance);
    let mut out = ThickPolyline::new();
    let mut last_width = None;
    for ((k, p), w) in keep.into_iter().zip(polyline.points()).zip(polyline.widths()) {
        let width_changed = last_width.is_some_and(|lw: i64| (lw - *w).abs() > width_tolerance);
        if k || width_changed {
            out.push(*p, *w);
            last_width = Some(*w);
        }
    }
    out
}

/// Simplify every polyline in place; a non-positive resolution leaves them untouched.
pub fn simplify_polylines(polylines: &mut [Polyline], resolution: CoordF) {
    if resolution <= 0.0 {
        return;
    }
    for pl in polylines.iter_mut() {
        *pl = douglas_peucker_polyline(pl, resolution);
    }
}
