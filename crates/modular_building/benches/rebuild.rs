mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn rebuild_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly/rebuild");

    for &side in &[4usize, 16, 32] {
        let parts = side * side * 2;
        group.throughput(common::elements_throughput(parts));

        group.bench_with_input(BenchmarkId::new("spatial_index", side), &side, |b, &side| {
            b.iter_batched(
                || common::foundation_grid(side, true),
                |mut assembly| {
                    let summary = assembly.rebuild().expect("rebuild");
                    black_box(summary);
                },
                BatchSize::LargeInput,
            );
        });

        // The full scan is quadratic; keep it to the smaller grids.
        if side <= 16 {
            group.bench_with_input(BenchmarkId::new("full_scan", side), &side, |b, &side| {
                b.iter_batched(
                    || common::foundation_grid(side, false),
                    |mut assembly| {
                        let summary = assembly.rebuild().expect("rebuild");
                        black_box(summary);
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = rebuild_benches
}
criterion_main!(benches);
