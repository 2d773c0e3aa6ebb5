//! Integration tests for infill generation
//!
//! These tests drive the public API end to end: a surface goes in, toolpaths
//! come out, and the properties every fill must keep are checked on the result.

use slicer_fill::geometry::total_length;
use slicer_fill::{
    adjust_solid_spacing, connect_infill, fill_surfaces_parallel, offset_expolygon, scale, unscale,
    Coord, CoordF, Error, ExPolygon, Fill, FillJob, FillParams, InfillPattern, OffsetJoinType,
    Octree, Point, PointF, Polygon, Polyline, Polylines, Surface, Vec3d,
};

// ============================================================================
// Helpers
// ============================================================================

fn square(size: CoordF) -> ExPolygon {
    ExPolygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(size, size))
}

/// 20 mm square with a 6 mm square hole in the middle.
fn square_with_hole() -> ExPolygon {
    let mut hole = Polygon::rectangle(Point::new_scale(7.0, 7.0), Point::new_scale(13.0, 13.0));
    hole.make_clockwise();
    ExPolygon::with_holes(square(20.0).contour, vec![hole])
}

fn fill_for(pattern: InfillPattern) -> Fill<'static> {
    let mut fill = Fill::new_from_type(pattern);
    fill.state.spacing = 0.45;
    fill.state.angle = Some(0.0);
    fill
}

/// Raw lines, no connection along the boundary.
fn unconnected(density: CoordF) -> FillParams {
    FillParams::with_density(density).anchors(0.0, 0.0)
}

fn all_points(polylines: &Polylines) -> impl Iterator<Item = &Point> {
    polylines.iter().flat_map(|pl| pl.points())
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_full_infill_boundary() {
    assert!(!FillParams::with_density(0.9999).full_infill());
    assert!(FillParams::with_density(0.99995).full_infill());
}

#[test]
fn test_solid_spacing_tiles_width() {
    let width = 10_000;
    let spacing = adjust_solid_spacing(width, 400);
    assert_eq!(width % spacing, 0);
    assert!(spacing >= 400);

    // 9.55 mm at 0.45 mm: 21 intervals, stretched a little
    let spacing = adjust_solid_spacing(9_550_000, 450_000);
    assert_eq!(spacing, 9_550_000 / 21);
}

#[test]
fn test_unknown_pattern_name() {
    let err = "voronoi".parse::<InfillPattern>().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!err.is_internal());
}

// ============================================================================
// Rectilinear family
// ============================================================================

#[test]
fn test_rectilinear_square_line_count() {
    let mut fill = fill_for(InfillPattern::Rectilinear);
    let out = fill
        .fill_surface(&Surface::internal(square(10.0)), &unconnected(0.2))
        .unwrap();
    // 9.55 mm of inset width at a 2.25 mm pitch
    assert!((4..=5).contains(&out.len()), "{} lines", out.len());
    let bbox = square(10.0).bounding_box();
    assert!(all_points(&out).all(|p| bbox.contains_point(p)));
}

#[test]
fn test_solid_fill_tiles_region_exactly() {
    let mut fill = fill_for(InfillPattern::Rectilinear);
    let params = FillParams::with_density(1.0).adjust(true).anchors(0.0, 0.0);
    let out = fill.fill_surface(&Surface::internal(square(10.0)), &params).unwrap();
    assert_eq!(out.len(), 21);

    let pitch = scale(fill.state.spacing);
    assert!(pitch >= scale(0.45) && pitch <= scale(0.45 * 1.2));

    // Layer 0 runs the lines along x; they sit half a pitch in from each side
    // of the inset region and exactly one pitch apart.
    let mut ys: Vec<Coord> = out.iter().map(|pl| pl.first_point().y).collect();
    ys.sort_unstable();
    let inset = scale(0.225);
    assert!((ys[0] - (inset + pitch / 2)).abs() <= 50, "{ys:?}");
    assert!((ys[20] - (scale(10.0) - inset - pitch / 2)).abs() <= 50, "{ys:?}");
    assert!(ys.windows(2).all(|w| (w[1] - w[0] - pitch).abs() <= 5), "{ys:?}");
}

#[test]
fn test_without_adjustment_spacing_is_kept() {
    let mut fill = fill_for(InfillPattern::Rectilinear);
    let _ = fill
        .fill_surface(&Surface::internal(square(10.0)), &FillParams::with_density(1.0))
        .unwrap();
    assert_eq!(fill.state.spacing, 0.45);
}

#[test]
fn test_length_grows_with_density() {
    for pattern in [InfillPattern::Rectilinear, InfillPattern::Grid, InfillPattern::Triangles] {
        let mut last = 0.0;
        for density in [0.1, 0.3, 0.5, 0.8, 1.0] {
            let mut fill = fill_for(pattern);
            let out = fill
                .fill_surface(&Surface::internal(square(20.0)), &unconnected(density))
                .unwrap();
            let length = total_length(&out);
            assert!(length >= last, "{pattern} at {density}: {length} < {last}");
            last = length;
        }
    }
}

#[test]
fn test_layers_alternate_direction() {
    let surface = Surface::internal(square(10.0));
    let mut fill = fill_for(InfillPattern::Rectilinear);

    fill.state.layer_id = Some(0);
    let even = fill.fill_surface(&surface, &unconnected(0.2)).unwrap();
    fill.state.layer_id = Some(1);
    let odd = fill.fill_surface(&surface, &unconnected(0.2)).unwrap();

    let horizontal = |pl: &Polyline| (pl.first_point().y - pl.last_point().y).abs() <= 2;
    let vertical = |pl: &Polyline| (pl.first_point().x - pl.last_point().x).abs() <= 2;
    assert!(even.iter().all(horizontal));
    assert!(odd.iter().all(vertical));
}

#[test]
fn test_monotonic_paths_advance_across_lines() {
    let surface = Surface::internal(square_with_hole());
    let mut fill = fill_for(InfillPattern::Monotonic);
    let axis = PointF::from_angle(fill.infill_direction(&surface).angle);
    let out = fill
        .fill_surface(&surface, &FillParams::with_density(0.3))
        .unwrap();
    assert!(out.len() > 1);

    let starts: Vec<CoordF> = out
        .iter()
        .map(|pl| axis.dot(&pl.first_point().to_f64()))
        .collect();
    // projections are in mm
    assert!(
        starts.windows(2).all(|w| w[1] >= w[0] - unscale(5)),
        "{starts:?}"
    );
}

// ============================================================================
// Connector
// ============================================================================

/// The region the fill actually clips to: half a line in from the surface.
fn inset_region() -> ExPolygon {
    let mut islands = offset_expolygon(&square_with_hole(), -0.225, OffsetJoinType::Miter);
    assert_eq!(islands.len(), 1);
    islands.remove(0)
}

fn raw_lines() -> Polylines {
    let mut fill = fill_for(InfillPattern::Rectilinear);
    fill.fill_surface(&Surface::internal(square_with_hole()), &unconnected(0.3))
        .unwrap()
}

#[test]
fn test_dont_connect_returns_raw_lines() {
    let lines = raw_lines();
    let params = FillParams::with_density(0.3).anchors(1.0, 0.02);
    let out = connect_infill(lines.clone(), &inset_region(), 0.45, 0, &params);
    assert_eq!(out.len(), lines.len());
    assert_eq!(out, lines);
}

#[test]
fn test_connector_is_deterministic() {
    let region = inset_region();
    let params = FillParams::with_density(0.3).anchors(2.0, 1000.0);
    let first = connect_infill(raw_lines(), &region, 0.45, 0, &params);
    for _ in 0..3 {
        assert_eq!(connect_infill(raw_lines(), &region, 0.45, 0, &params), first);
    }
}

#[test]
fn test_connecting_reduces_path_count() {
    let lines = raw_lines();
    let params = FillParams::with_density(0.3).anchors(0.0, 1000.0);
    let out = connect_infill(lines.clone(), &inset_region(), 0.45, 0, &params);
    assert!(out.len() < lines.len());
    // links only add length
    assert!(total_length(&out) >= total_length(&lines) - 1.0);
}

#[test]
fn test_link_limit_holds_for_complete_fill() {
    // links between 2.25 mm rows are all longer than the 1 mm limit
    let params = FillParams::with_density(0.2).anchors(0.0, 1000.0);
    let paths = |complete: bool| {
        let mut fill = fill_for(InfillPattern::Rectilinear);
        fill.state.link_max_length = scale(1.0);
        fill.fill_surface(&Surface::internal(square(10.0)), &params.complete(complete)).unwrap()
    };
    let partial = paths(false);
    assert!(partial.len() > 1);
    assert_eq!(paths(true).len(), partial.len());
}

#[test]
fn test_equal_arcs_take_contour_order() {
    let line = |a: (CoordF, CoordF), b: (CoordF, CoordF)| {
        Polyline::from_points(vec![Point::new_scale(a.0, a.1), Point::new_scale(b.0, b.1)])
    };
    // both arcs between (5, 0) and (5, 10) measure 20 mm
    let lines = vec![line((5.0, 5.0), (5.0, 0.0)), line((5.0, 10.0), (5.0, 6.0))];
    let params = FillParams::with_density(0.2).anchors(0.0, 1000.0);
    let out = connect_infill(lines, &square(10.0), 0.45, 0, &params);
    assert_eq!(out.len(), 1);
    // counter-clockwise from the bottom edge passes the right side
    assert!(out[0].points().contains(&Point::new_scale(10.0, 0.0)));
    assert!(out[0].points().contains(&Point::new_scale(10.0, 10.0)));
}

// ============================================================================
// All patterns
// ============================================================================

#[test]
fn test_empty_surface_gives_no_paths() {
    // Three collinear points: a contour with no area.
    let flat = Polygon::from_points(vec![
        Point::new_scale(0.0, 0.0),
        Point::new_scale(5.0, 5.0),
        Point::new_scale(10.0, 10.0),
    ]);
    let surfaces = [
        Surface::internal(ExPolygon::new(Polygon::default())),
        Surface::internal(ExPolygon::new(flat.clone())),
        Surface::internal_solid(ExPolygon::new(flat)),
    ];
    let densities = [
        FillParams::with_density(0.1),
        FillParams::with_density(0.2),
        FillParams::with_density(1.0).adjust(true),
    ];
    for pattern in InfillPattern::ALL {
        for surface in &surfaces {
            for params in &densities {
                let mut fill = fill_for(pattern);
                let out = fill.fill_surface(surface, params).unwrap();
                assert!(out.is_empty(), "{pattern} {surface:?} {}", params.density);
            }
        }
    }
}

#[test]
fn test_zero_density_gives_no_paths() {
    for pattern in InfillPattern::ALL {
        let mut fill = fill_for(pattern);
        let out = fill
            .fill_surface(&Surface::internal(square(10.0)), &FillParams::with_density(0.0))
            .unwrap();
        assert!(out.is_empty(), "{pattern}");
    }
}

#[test]
fn test_every_pattern_stays_inside() {
    let octree = Octree::dense(Vec3d::new(10.0, 10.0, 10.0), 20.0, 0.45 / 0.2).unwrap();
    let surface = Surface::internal(square(20.0));
    let bbox = surface.expolygon.bounding_box().expanded(2);

    for pattern in InfillPattern::ALL {
        let mut fill = Fill::new_from_type(pattern).with_octree(&octree);
        fill.state.spacing = 0.45;
        fill.state.angle = Some(0.0);
        fill.state.layer_id = Some(3);
        fill.state.z = 10.0;
        let out = fill.fill_surface(&surface, &FillParams::with_density(0.2)).unwrap();
        assert!(!out.is_empty(), "{pattern} gave nothing");
        assert!(
            all_points(&out).all(|p| bbox.contains_point(p)),
            "{pattern} left the region"
        );
    }
}

#[test]
fn test_adaptive_without_octree_is_a_config_error() {
    let mut fill = fill_for(InfillPattern::AdaptiveCubic);
    let err = fill
        .fill_surface(&Surface::internal(square(10.0)), &FillParams::with_density(0.2))
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_duplicates_are_independent() {
    let original = fill_for(InfillPattern::Rectilinear);
    let mut copy = original.duplicate();
    let params = FillParams::with_density(1.0).adjust(true);
    copy.fill_surface(&Surface::internal(square(10.0)), &params).unwrap();

    assert_ne!(copy.state.spacing, 0.45);
    assert_eq!(original.state.spacing, 0.45);
    assert_eq!(copy.pattern(), original.pattern());
}

#[test]
fn test_bridge_uses_bridge_angle() {
    let mut fill = fill_for(InfillPattern::Rectilinear);
    fill.state.layer_id = Some(1);
    let surface = Surface::bridge(square(10.0), Some(0.0));
    let direction = fill.infill_direction(&surface);
    // the layer alternation does not apply to bridges
    assert!((direction.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn test_parallel_layers_match_sequential() {
    let prototype = fill_for(InfillPattern::Honeycomb);
    let params = FillParams::with_density(0.25);
    let jobs: Vec<FillJob> = (0..6)
        .map(|layer| {
            FillJob::new(layer, 0.2 * (layer + 1) as CoordF, Surface::internal(square_with_hole()))
        })
        .collect();

    let results = fill_surfaces_parallel(&prototype, &jobs, &params);
    assert_eq!(results.len(), jobs.len());
    for (job, result) in jobs.iter().zip(results) {
        let mut fill = prototype.duplicate();
        fill.state.layer_id = Some(job.layer_id);
        fill.state.z = job.z;
        assert_eq!(result.unwrap(), fill.fill_surface(&job.surface, &params).unwrap());
    }
}
