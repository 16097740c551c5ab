//! # Transformation Benchmarks
//!
//! Performance benchmarks for the funnelwatch-core transformations.
//!
//! Run with: `cargo bench -p funnelwatch-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use funnelwatch_core::{
    Layer, RawMetricRecord, Stage, TimeRange, parse_records, route_records, transform_funnel_data,
    transform_reliability_metrics, trend_summaries,
};
use std::hint::black_box;

/// A batch alternating funnel and reliability records.
fn create_mixed_batch(size: usize) -> Vec<RawMetricRecord> {
    (0..size)
        .map(|i| {
            if i % 2 == 0 {
                RawMetricRecord {
                    funnel_stage: Some(Stage::CANONICAL[(i / 2) % 4]),
                    current_value: Some(1_000.0),
                    conversion_rate: Some(80.0),
                    ..Default::default()
                }
            } else {
                RawMetricRecord {
                    layer: Some(Layer::ALL[(i / 2) % 4]),
                    metric_name: Some(format!("metric-{i}")),
                    current_value: Some(97.5),
                    ..Default::default()
                }
            }
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_records");

    for size in [10, 100, 1000] {
        let batch = create_mixed_batch(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| route_records(black_box(batch)));
        });
    }

    group.finish();
}

fn bench_transformations(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for size in [10, 100, 1000] {
        let records = route_records(&create_mixed_batch(size));
        group.bench_with_input(BenchmarkId::new("funnel", size), &records, |b, records| {
            b.iter(|| transform_funnel_data(black_box(records)));
        });
        group.bench_with_input(
            BenchmarkId::new("reliability", size),
            &records,
            |b, records| {
                b.iter(|| transform_reliability_metrics(black_box(records)));
            },
        );
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let json = serde_json::to_vec(&create_mixed_batch(1000)).expect("serialize");

    c.bench_function("parse_records_1000", |b| {
        b.iter(|| parse_records(black_box(&json)).expect("parse"));
    });
}

fn bench_trends(c: &mut Criterion) {
    c.bench_function("trend_summaries_30d", |b| {
        b.iter(|| trend_summaries(black_box(TimeRange::Month)));
    });
}

criterion_group!(
    benches,
    bench_routing,
    bench_transformations,
    bench_parse,
    bench_trends
);
criterion_main!(benches);
