//! Registry benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sqlbridge_core::Registry;
use std::sync::Arc;
use std::thread;

/// Benchmark insert followed by remove.
fn bench_insert_remove(c: &mut Criterion) {
    let registry: Registry<u64> = Registry::new();

    c.bench_function("registry_insert_remove", |b| {
        b.iter(|| {
            let h = registry.insert(black_box(7));
            black_box(registry.remove(h));
        });
    });
}

/// Benchmark lookups against registries of different sizes.
fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_get");

    for size in [16, 1_024, 65_536].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let registry: Registry<u64> = Registry::new();
            let handles: Vec<_> = (0..size as u64).map(|v| registry.insert(v)).collect();
            let mut idx = 0;

            b.iter(|| {
                let value = registry.get(black_box(handles[idx]));
                idx = (idx + 1) % handles.len();
                black_box(value);
            });
        });
    }

    group.finish();
}

/// Benchmark inserts from several threads at once, by shard count.
fn bench_contended_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_contended_insert");
    group.sample_size(20);
    let threads = 4;
    let per_thread = 1_000;

    for shards in [1, 4, 16, 64].iter() {
        group.throughput(Throughput::Elements((threads * per_thread) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(shards), shards, |b, &shards| {
            b.iter(|| {
                let registry: Arc<Registry<u64>> = Arc::new(Registry::with_shards(shards));
                let workers: Vec<_> = (0..threads)
                    .map(|_| {
                        let registry = Arc::clone(&registry);
                        thread::spawn(move || {
                            for v in 0..per_thread as u64 {
                                let h = registry.insert(v);
                                if v % 2 == 0 {
                                    registry.remove(h);
                                }
                            }
                        })
                    })
                    .collect();
                for w in workers {
                    w.join().unwrap();
                }
                black_box(registry.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert_remove, bench_get, bench_contended_insert);

criterion_main!(benches);
