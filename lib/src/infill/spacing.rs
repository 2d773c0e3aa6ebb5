//! Solid infill spacing adjustment.

use crate::{Coord, CoordF};

/// How much a solid infill line may be spread beyond its nominal spacing.
const MAX_SPACING_FACTOR: CoordF = 1.2;

/// Adjust the line distance so that an integer number of intervals tiles `width`.
///
/// Takes the largest count of intervals that fits at `distance` and spreads the
/// remainder over them. The result never exceeds `distance * 1.2`; a span narrower
/// than one interval (or a non-positive width) keeps `distance` unchanged.
///
/// # Panics
/// When `distance` is not positive.
pub fn adjust_solid_spacing(width: Coord, distance: Coord) -> Coord {
    assert!(distance > 0, "solid spacing must be positive, got {distance}");
    if width <= 0 {
        return distance;
    }

    let number_of_intervals = width / distance;
    if number_of_intervals == 0 {
        return distance;
    }
    let distance_new = width / number_of_intervals;
    debug_assert!(distance_new >= distance);

    let factor = distance_new as CoordF / distance as CoordF;
    if factor > MAX_SPACING_FACTOR {
        (distance as CoordF * MAX_SPACING_FACTOR + 0.5).floor() as Coord
    } else {
        distance_new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple_is_kept() {
        let s = adjust_solid_spacing(10_000, 400);
        assert_eq!(s, 400);
        assert_eq!(10_000 % s, 0);
    }

    #[test]
    fn test_remainder_is_spread() {
        // 10_100 / 400 = 25 intervals, 100 left over -> 4 per interval
        let s = adjust_solid_spacing(10_100, 400);
        assert_eq!(s, 404);
        assert_eq!(10_100 % s, 0);
    }

    #[test]
    fn test_residual_per_interval_below_one_unit() {
        for width in [9_550_000, 10_000_001, 12_345_678] {
            let nominal = 450_000;
            let s = adjust_solid_spacing(width, nominal);
            let n = width / s;
            assert!(s >= nominal);
            assert!(width - n * s < n, "width {width} s {s}");
        }
    }

    #[test]
    fn test_narrow_span_keeps_distance() {
        assert_eq!(adjust_solid_spacing(300, 400), 400);
        assert_eq!(adjust_solid_spacing(0, 400), 400);
        assert_eq!(adjust_solid_spacing(-10, 400), 400);
    }

    #[test]
    fn test_spread_is_capped() {
        // One interval of 700 would stretch a 400 line by 75%.
        assert_eq!(adjust_solid_spacing(700, 400), 480);
    }

    #[test]
    #[should_panic(expected = "solid spacing must be positive")]
    fn test_zero_distance_panics() {
        adjust_solid_spacing(10_000, 0);
    }
}
