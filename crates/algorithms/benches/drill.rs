//! Benchmarks for drill requests

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drillstat_algorithms::drill::{drill, DrillParams};
use drillstat_core::{GeoTransform, MemoryRaster, Zone};
use geo::{Geometry, LineString, Polygon};

const BANDS: usize = 24;

fn create_stack(size: usize) -> MemoryRaster {
    let samples: Vec<f32> = (0..BANDS)
        .flat_map(|band| {
            (0..size * size).map(move |i| {
                let (row, col) = (i / size, i % size);
                (band * 3 + (row * 7 + col * 13) % 100) as f32
            })
        })
        .collect();
    MemoryRaster::from_vec(BANDS, size, size, samples)
        .unwrap()
        .with_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0))
        .with_nodata(Some(-9999.0))
}

/// A diamond covering roughly half of the raster
fn diamond(size: usize) -> Zone {
    let (c, r) = (size as f64 / 2.0, size as f64 / 2.0 - 0.5);
    Zone::new(Geometry::Polygon(Polygon::new(
        LineString::from(vec![(c, c - r), (c + r, c), (c, c + r), (c - r, c), (c, c - r)]),
        vec![],
    )))
}

fn bench_strides(c: &mut Criterion) {
    let mut group = c.benchmark_group("drill_strides");
    let stack = create_stack(256);
    let zone = diamond(256);

    for strides in [1_i64, 4, 12].iter() {
        let params = DrillParams::new((1..=BANDS).collect())
            .with_band_strides(*strides)
            .with_decile_count(9);

        group.bench_with_input(BenchmarkId::from_parameter(strides), strides, |b, _| {
            b.iter(|| drill(black_box(&stack), black_box(&zone), &params).unwrap())
        });
    }

    group.finish();
}

fn bench_zone_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("drill_zone_size");

    for size in [64, 256, 512].iter() {
        let stack = create_stack(*size);
        let zone = diamond(*size);
        let params = DrillParams::new((1..=BANDS).collect()).with_band_strides(4);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| drill(black_box(&stack), black_box(&zone), &params).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strides, bench_zone_size);
criterion_main!(benches);
