use criterion::{black_box, criterion_group, criterion_main, Criterion};

use corrfit::statistics::{correlation_matrix, draw_indices, fold_all};
use corrfit::{Model, SampleSet, TimeSeries};

fn synthetic_set(n_configs: usize, time_extent: usize) -> SampleSet {
    let model = Model::Cosh { time_extent };
    let series: Vec<TimeSeries> = (0..n_configs)
        .map(|k| {
            // Deterministic per-configuration wiggle; no RNG needed for a
            // throughput benchmark.
            let jitter = 1.0 + 1e-3 * (k as f64).sin();
            TimeSeries::new(
                (0..time_extent)
                    .map(|t| model.eval(t as f64, &[0.25, jitter]))
                    .collect(),
            )
        })
        .collect();
    SampleSet::new(series).unwrap()
}

fn bench_resampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("resampling");
    let raw = synthetic_set(100, 48);
    let folded = fold_all(&raw).unwrap();

    group.bench_function("draw_indices_500x100", |b| {
        b.iter(|| black_box(draw_indices(100, 500, 42)));
    });

    group.bench_function("fold_100x48", |b| {
        b.iter(|| black_box(fold_all(&raw).unwrap()));
    });

    group.bench_function("correlation_matrix_100x25", |b| {
        b.iter(|| black_box(correlation_matrix(&folded)));
    });
    group.finish();
}

criterion_group!(benches, bench_resampling);
criterion_main!(benches);
