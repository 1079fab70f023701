//! Geometry encoding benchmarks.
//!
//! Measures:
//! - Plain WKB encoding (geometries already under budget)
//! - The simplify-until-fit loop for oversized polygons
//! - Filter evaluation over stored fields (decode + predicate)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fluree_db_spatial_context::{
    parse_wkt, DistanceUnits, EncodedField, GeoStrategy, GeometryEncoder, SpatialArgs,
    SpatialContext,
};
use std::sync::Arc;

// ============================================================================
// Test Data Generation
// ============================================================================

/// WKT polygon approximating a circle with `n` vertices.
fn generate_ring(n: usize, center_lng: f64, center_lat: f64, radius_deg: f64) -> String {
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = (i as f64) * std::f64::consts::TAU / n as f64;
        let x = center_lng + radius_deg * angle.cos();
        let y = center_lat + radius_deg * angle.sin();
        coords.push(format!("{} {}", x, y));
    }
    coords.push(coords[0].clone());
    format!("POLYGON(({}))", coords.join(", "))
}

fn geo_strategy() -> GeoStrategy {
    let ctx = SpatialContext::bootstrap(DistanceUnits::Kilometers, None);
    GeoStrategy::new(Arc::new(ctx))
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encode_within_budget(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_within_budget");
    let encoder = GeometryEncoder::new(0);

    for vertices in [8, 64, 512] {
        let geom = parse_wkt(&generate_ring(vertices, 2.3522, 48.8566, 0.1)).unwrap();
        group.throughput(Throughput::Elements(vertices as u64));
        group.bench_with_input(BenchmarkId::new("ring", vertices), &geom, |b, geom| {
            b.iter(|| black_box(encoder.encode(geom).unwrap().len()));
        });
    }

    group.finish();
}

fn bench_encode_simplified(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_simplified");
    group.sample_size(20);

    // Print how many rounds each size needs (not timed)
    println!("\n=== Simplification Rounds (32000 byte budget) ===\n");
    let strategy = geo_strategy();
    for vertices in [5_000, 20_000, 80_000] {
        let shape = strategy
            .context()
            .read_shape(&generate_ring(vertices, 2.3522, 48.8566, 1.0))
            .unwrap();
        let (_, stats) = strategy.create_field_with_stats("geo", &shape).unwrap();
        println!(
            "{} vertices: {} -> {} bytes in {} rounds",
            vertices, stats.initial_len, stats.final_len, stats.rounds
        );
    }
    println!();

    for vertices in [5_000, 20_000, 80_000] {
        let shape = strategy
            .context()
            .read_shape(&generate_ring(vertices, 2.3522, 48.8566, 1.0))
            .unwrap();
        group.throughput(Throughput::Elements(vertices as u64));
        group.bench_with_input(
            BenchmarkId::new("create_field", vertices),
            &shape,
            |b, shape| {
                b.iter(|| black_box(strategy.create_field("geo", shape).unwrap().bytes.len()));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Filter Benchmarks
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let strategy = geo_strategy();
    let fields: Vec<EncodedField> = (0..1000)
        .map(|i| {
            let lng = -10.0 + (i % 40) as f64 * 0.5;
            let lat = 30.0 + (i / 40) as f64 * 0.5;
            let shape = strategy
                .context()
                .read_shape(&generate_ring(16, lng, lat, 0.1))
                .unwrap();
            strategy.create_field("geo", &shape).unwrap()
        })
        .collect();

    let mut group = c.benchmark_group("filter");
    group.throughput(Throughput::Elements(fields.len() as u64));

    for op in ["Intersects", "IsWithin", "BBoxIntersects"] {
        let args = SpatialArgs::parse(strategy.context(), &format!("{}(0 35 5 40)", op)).unwrap();
        let filter = strategy.make_filter(&args, "geo").unwrap();
        group.bench_with_input(BenchmarkId::new("matches", op), &fields, |b, fields| {
            b.iter(|| {
                let hits = fields
                    .iter()
                    .filter(|f| filter.matches(f).unwrap())
                    .count();
                black_box(hits)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_within_budget,
    bench_encode_simplified,
    bench_filter
);
criterion_main!(benches);
