//! Bead width distribution along a loop.
//!
//! A loop is extruded at the nominal bead width, except where the region left
//! inside it is too narrow for another bead. There the bead widens by half the
//! leftover gap; the opposite side of the loop takes the other half. The widening:
//! - ignores gaps narrower than the minimum feature size
//! - is skipped at corners sharper than the wall transition angle
//! - ramps up by at most one bead per wall transition length
//! - stays between the minimum bead width and twice the nominal width

use super::ArachneParams;
use crate::geometry::Point;
use crate::{scale, Coord, CoordF};

/// Width limits of the beads of one region, scaled.
#[derive(Debug, Clone, Copy)]
pub struct Beading {
    nominal: Coord,
    min_width: Coord,
    max_width: Coord,
    min_feature: CoordF,
    /// Width change allowed per unit of length along the loop.
    max_slope: CoordF,
    /// Sharpest interior angle still widened (radians).
    transition_angle: CoordF,
}

impl Beading {
    pub fn new(params: &ArachneParams) -> Self {
        let nominal = scale(params.bead_width);
        let transition_length = scale(params.wall_transition_length).max(1) as CoordF;
        Self {
            nominal,
            min_width: scale(params.min_bead_width).min(nominal),
            max_width: 2 * nominal,
            min_feature: scale(params.min_feature_size) as CoordF,
            max_slope: nominal as CoordF / transition_length,
            transition_angle: params.wall_transition_angle.to_radians(),
        }
    }

    #[inline]
    pub fn nominal(&self) -> Coord {
        self.nominal
    }

    #[inline]
    pub fn min_width(&self) -> Coord {
        self.min_width
    }

    /// Keep a width inside the printable range.
    #[inline]
    pub fn clamp(&self, width: Coord) -> Coord {
        width.clamp(self.min_width, self.max_width)
    }

    /// Width of a bead sharing a leftover gap of `gap` (scaled) with the
    /// opposite side. A leftover is never wider than one bead, longer
    /// measurements run along a thin strip and are cut to that.
    pub fn widened(&self, gap: CoordF) -> Coord {
        if gap < self.min_feature {
            return self.nominal;
        }
        let gap = gap.min(self.nominal as CoordF);
        self.clamp(self.nominal + (0.5 * gap).round() as Coord)
    }

    /// Whether a vertex with this interior angle (radians) may be widened.
    #[inline]
    pub fn widens_corner(&self, interior_angle: CoordF) -> bool {
        interior_angle >= self.transition_angle
    }

    /// Limit how fast the width changes along a closed loop.
    ///
    /// Widths only ever shrink here; two laps in each direction let the limit
    /// wrap around the seam.
    pub fn limit_transitions(&self, points: &[Point], widths: &mut [Coord]) {
        let n = points.len();
        if n < 2 || n != widths.len() {
            return;
        }
        let step = |from: usize, to: usize, widths: &mut [Coord]| {
            let allowed =
                widths[from] as CoordF + self.max_slope * points[from].distance(&points[to]);
            if (widths[to] as CoordF) > allowed {
                widths[to] = allowed.round() as Coord;
            }
        };
        for k in 0..2 * n {
            step(k % n, (k + 1) % n, widths);
        }
        for k in (0..2 * n).rev() {
            step((k + 1) % n, k % n, widths);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beading() -> Beading {
        Beading::new(&ArachneParams {
            bead_width: 0.4,
            ..ArachneParams::default()
        })
    }

    #[test]
    fn test_small_gaps_are_ignored() {
        let b = beading();
        assert_eq!(b.widened(scale(0.05) as CoordF), scale(0.4));
        assert_eq!(b.widened(scale(0.2) as CoordF), scale(0.5));
    }

    #[test]
    fn test_width_is_capped() {
        let b = beading();
        assert_eq!(b.widened(scale(3.0) as CoordF), scale(0.6));
        assert_eq!(b.clamp(0), scale(0.1));
        assert_eq!(b.clamp(scale(10.0)), scale(0.8));
    }

    #[test]
    fn test_sharp_corners_keep_nominal() {
        let b = beading();
        assert!(!b.widens_corner(5f64.to_radians()));
        assert!(b.widens_corner(90f64.to_radians()));
    }

    #[test]
    fn test_transitions_are_ramped() {
        let b = beading();
        // 0.1 mm apart along a line; one wide point in the middle
        let points: Vec<Point> = (0..9).map(|i| Point::new_scale(i as CoordF * 0.1, 0.0)).collect();
        let mut widths = vec![scale(0.4); 9];
        widths[4] = scale(0.8);
        b.limit_transitions(&points, &mut widths);
        // at most 0.4 mm of width per 0.4 mm of length
        assert_eq!(widths[4], scale(0.5));
        assert_eq!(widths[3], scale(0.4));
    }
}
