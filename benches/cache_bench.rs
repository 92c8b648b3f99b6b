//! Benchmarks for the memoization cache.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fastmemo::{ArgValue, CallArgs, KeyBuilder, MemoConfig, Memoized, UnhashablePolicy};

fn first_int(args: &CallArgs) -> i64 {
    match args.positional() {
        [ArgValue::Int(n), ..] => *n,
        _ => 0,
    }
}

/// Benchmark the memoized call path.
fn bench_calls(c: &mut Criterion) {
    let mut group = c.benchmark_group("calls");

    let memo = Memoized::new(MemoConfig::new().maxsize(100_000).build(), first_int);

    // Pre-populate some keys
    for n in 0..10_000i64 {
        let _ = memo.call(&CallArgs::new().arg(n));
    }

    group.bench_function("hit", |b| {
        let mut i = 0i64;
        b.iter(|| {
            let args = CallArgs::new().arg(i % 10_000);
            black_box(memo.call(&args).unwrap());
            i += 1;
        });
    });

    group.bench_function("miss_insert", |b| {
        let memo = Memoized::new(MemoConfig::new().maxsize(1_000_000).build(), first_int);
        let mut i = 0i64;
        b.iter(|| {
            let args = CallArgs::new().arg(i);
            black_box(memo.call(&args).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark key construction.
fn bench_key_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_building");

    let args = CallArgs::new()
        .arg(42i64)
        .arg("label")
        .kwarg("verbose", true)
        .kwarg("scale", 2.5);

    for (name, typed) in [("untyped", false), ("typed", true)] {
        let builder = KeyBuilder::new(typed, Vec::new(), UnhashablePolicy::Error);
        group.bench_function(name, |b| {
            b.iter(|| black_box(builder.build(&args).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark eviction under pressure.
fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");

    // Small cache that will constantly evict
    let memo = Memoized::new(MemoConfig::new().maxsize(1000).build(), first_int);
    for n in 0..1000i64 {
        let _ = memo.call(&CallArgs::new().arg(n));
    }

    group.bench_function("call_with_eviction", |b| {
        let mut i = 1000i64;
        b.iter(|| {
            let _ = memo.call(&CallArgs::new().arg(i));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent memoized calls.
fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2i64, 4, 8].iter() {
        let memo = Memoized::new(MemoConfig::new().maxsize(100_000).build(), first_int);
        for n in 0..10_000i64 {
            let _ = memo.call(&CallArgs::new().arg(n));
        }

        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::new("mixed_ops", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|t: i64| {
                            let memo = memo.clone();
                            std::thread::spawn(move || {
                                for i in 0..1000i64 {
                                    let n = (t * 1000 + i) % 10_000;
                                    black_box(memo.call(&CallArgs::new().arg(n)).unwrap());
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_calls,
    bench_key_building,
    bench_eviction,
    bench_concurrent,
);
criterion_main!(benches);
