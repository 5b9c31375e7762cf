//! # Multi-Swarm Benchmarks
//!
//! End-to-end runs through the coordinator: thread spawn, ring exchanges,
//! snapshot delivery to a discarding render pipe and the final reduction.
//!
//! Run: `cargo bench --bench multiswarm_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mswarm_core::Benchmark;
use mswarm_orchestration::{MultiSwarm, RunConfig, RunParameters, Schedule};

fn coordinator(swarms: usize, switches: usize) -> MultiSwarm {
    let config = RunConfig {
        swarm_count: swarms,
        particles_per_swarm: 20,
        iteration_count: 100,
        switch_count: switches,
        switch_best_particle_count: 5,
        lower: vec![-500.0, -500.0],
        upper: vec![500.0, 500.0],
        function: Benchmark::Schwefel,
        seed: Some(42),
        ..RunConfig::default()
    };
    MultiSwarm::new(RunParameters::from_config(&config).unwrap()).unwrap()
}

/// Benchmark full runs by swarm count
fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(20);

    for swarms in [1, 2, 4, 8] {
        let ms = coordinator(swarms, 10);
        group.bench_with_input(BenchmarkId::new("swarms", swarms), &swarms, |b, _| {
            b.iter(|| black_box(ms.run_discarding().unwrap().best_cost))
        });
    }

    group.finish();
}

/// Benchmark exchange overhead: same work, more rendezvous points
fn bench_exchange_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("exchange_rounds");
    group.sample_size(20);

    for switches in [0, 10, 50] {
        let ms = coordinator(4, switches);
        group.bench_with_input(BenchmarkId::from_parameter(switches), &switches, |b, _| {
            b.iter(|| black_box(ms.run_discarding().unwrap().best_cost))
        });
    }

    group.finish();
}

/// Benchmark schedule construction
fn bench_schedule(c: &mut Criterion) {
    c.bench_function("schedule_1000x100", |b| {
        b.iter(|| black_box(Schedule::new(black_box(1000), black_box(100), black_box(16))))
    });
}

criterion_group!(benches, bench_run, bench_exchange_rounds, bench_schedule);

criterion_main!(benches);
