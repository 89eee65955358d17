//! # Arena Benchmark
//!
//! Measures the cost of bump allocation against the global allocator for the
//! per-frame scratch pattern: many small carve-outs, then one reset.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use handmade_core::{megabytes, Arena};

fn bench_bump_alloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_frame_scratch");

    for allocations in [64, 512, 4096] {
        let mut arena = Arena::create(megabytes(4)).unwrap();

        group.bench_with_input(
            BenchmarkId::new("arena", allocations),
            &allocations,
            |b, &allocations| {
                b.iter(|| {
                    arena.reset();
                    for i in 0..allocations {
                        let handle = arena.alloc::<f32>(black_box(16 + (i % 16))).unwrap();
                        black_box(handle);
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("vec", allocations),
            &allocations,
            |b, &allocations| {
                b.iter(|| {
                    for i in 0..allocations {
                        let v = vec![0.0f32; black_box(16 + (i % 16))];
                        black_box(v);
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_typed_view(c: &mut Criterion) {
    let mut arena = Arena::create(megabytes(1)).unwrap();
    let samples = arena.alloc::<f32>(48_000 / 10 * 2).unwrap();

    c.bench_function("arena_slice_mut_fill", |b| {
        b.iter(|| {
            let out = arena.slice_mut(&samples).unwrap();
            for (i, s) in out.iter_mut().enumerate() {
                *s = black_box(i as f32);
            }
        });
    });
}

criterion_group!(benches, bench_bump_alloc, bench_typed_view);
criterion_main!(benches);
