//! # PSO Benchmarks
//!
//! Measures the single-swarm hot path: swarm creation, one iteration and the
//! migration helpers used at every exchange.
//!
//! Run: `cargo bench --bench pso_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mswarm_core::prelude::*;
use mswarm_pso::{Coefficients, Swarm};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

fn swarm(size: usize, world: &BoxWorld, rng: &mut StdRng) -> Swarm {
    Swarm::create(0, size, world, Arc::new(Benchmark::Schwefel), rng).unwrap()
}

/// Benchmark swarm creation
fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    let world = BoxWorld::symmetric(500.0, 2).unwrap();

    for size in [20, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| black_box(swarm(size, &world, &mut rng)))
        });
    }

    group.finish();
}

/// Benchmark one PSO iteration per swarm size and dimension
fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    let coefficients = Coefficients::default();

    for dimension in [2, 10] {
        let world = BoxWorld::symmetric(500.0, dimension).unwrap();
        for size in [20, 100] {
            let mut rng = StdRng::seed_from_u64(2);
            let mut s = swarm(size, &world, &mut rng);
            group.bench_function(format!("{size}x{dimension}d"), |b| {
                b.iter(|| {
                    s.iterate(&world, &coefficients, &mut rng).unwrap();
                    black_box(s.best_cost())
                })
            });
        }
    }

    group.finish();
}

/// Benchmark sort + emigrants + receive, the per-exchange swarm work
fn bench_migration(c: &mut Criterion) {
    let mut group = c.benchmark_group("migration");
    let world = BoxWorld::symmetric(500.0, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let donor = swarm(100, &world, &mut rng);

    group.bench_function("sort_100", |b| {
        b.iter(|| {
            let mut s = donor.snapshot();
            s.sort_for_migration();
            black_box(s)
        })
    });

    group.bench_function("exchange_5_of_100", |b| {
        let mut s = swarm(100, &world, &mut rng);
        b.iter(|| {
            s.sort_for_migration();
            let migrants = donor.emigrants(5);
            s.receive_migrants(migrants).unwrap();
            black_box(s.best_cost())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_create, bench_iterate, bench_migration);

criterion_main!(benches);
