//! Benchmarks for infill generation.
//!
//! Run with: `cargo bench -p slicer-fill`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slicer_fill::{
    connect_infill, fill_surfaces_parallel, offset_expolygon, ExPolygon, Fill, FillJob,
    FillParams, InfillPattern, OffsetJoinType, Octree, Point, Polygon, Polylines, Surface, Vec3d,
};

/// 50 mm square with two rectangular holes.
fn bench_region() -> ExPolygon {
    let contour = Polygon::rectangle(Point::new_scale(0.0, 0.0), Point::new_scale(50.0, 50.0));
    let mut holes = vec![
        Polygon::rectangle(Point::new_scale(10.0, 10.0), Point::new_scale(20.0, 40.0)),
        Polygon::rectangle(Point::new_scale(30.0, 20.0), Point::new_scale(42.0, 28.0)),
    ];
    for hole in &mut holes {
        hole.make_clockwise();
    }
    ExPolygon::with_holes(contour, holes)
}

fn fill_for(pattern: InfillPattern) -> Fill<'static> {
    let mut fill = Fill::new_from_type(pattern);
    fill.state.spacing = 0.45;
    fill.state.angle = Some(45f64.to_radians());
    fill.state.layer_id = Some(7);
    fill.state.z = 25.0;
    fill
}

fn bench_patterns(c: &mut Criterion) {
    let surface = Surface::internal(bench_region());
    let params = FillParams::with_density(0.2);
    let octree = Octree::dense(Vec3d::new(25.0, 25.0, 25.0), 50.0, 0.45 / 0.2);

    let mut group = c.benchmark_group("fill_surface");
    for pattern in InfillPattern::ALL {
        let mut fill = Fill::new_from_type(pattern);
        if let Some(octree) = &octree {
            fill = fill.with_octree(octree);
        }
        fill.state = fill_for(pattern).state;
        group.bench_with_input(BenchmarkId::from_parameter(pattern), &surface, |b, surface| {
            b.iter(|| fill.fill_surface(black_box(surface), &params))
        });
    }
    group.finish();
}

fn bench_solid(c: &mut Criterion) {
    let surface = Surface::internal_solid(bench_region());
    let params = FillParams::with_density(1.0).adjust(true);

    c.bench_function("solid_rectilinear", |b| {
        b.iter(|| {
            let mut fill = fill_for(InfillPattern::Rectilinear);
            fill.fill_surface(black_box(&surface), &params)
        })
    });
}

fn bench_connect(c: &mut Criterion) {
    let region = bench_region();
    let mut islands = offset_expolygon(&region, -0.225, OffsetJoinType::Miter);
    let Some(inset) = islands.pop() else {
        return;
    };
    let raw: Polylines = fill_for(InfillPattern::Rectilinear)
        .fill_surface(
            &Surface::internal(region),
            &FillParams::with_density(0.3).anchors(0.0, 0.0),
        )
        .unwrap_or_default();
    let params = FillParams::with_density(0.3);

    c.bench_function("connect_infill", |b| {
        b.iter(|| connect_infill(black_box(raw.clone()), &inset, 0.45, 0, &params))
    });
}

fn bench_batch(c: &mut Criterion) {
    let prototype = fill_for(InfillPattern::Honeycomb);
    let params = FillParams::with_density(0.2);

    let mut group = c.benchmark_group("fill_surfaces_parallel");
    for &layers in &[1usize, 16, 64] {
        let jobs: Vec<FillJob> = (0..layers)
            .map(|layer| {
                FillJob::new(layer, 0.2 * (layer + 1) as f64, Surface::internal(bench_region()))
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(layers), &jobs, |b, jobs| {
            b.iter(|| fill_surfaces_parallel(&prototype, black_box(jobs), &params))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_patterns, bench_solid, bench_connect, bench_batch);
criterion_main!(benches);
