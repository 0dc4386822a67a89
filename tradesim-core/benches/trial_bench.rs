//! Criterion benchmarks for the trial engine hot path.
//!
//! Benchmarks:
//! 1. Single trial at several trade counts (fixed and percent sizing)
//! 2. Streak analysis over long outcome sequences
//! 3. Replay of an outcome sequence

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use tradesim_core::{analyze, replay, simulate, SimulationConfig, Sizing};

fn config(num_trades: usize, sizing: Sizing) -> SimulationConfig {
    SimulationConfig {
        initial_capital: 1000.0,
        win_rate: 0.1,
        risk_to_reward: 15.0,
        sizing,
        num_trades,
        concurrent_trades: 20,
        num_runs: 1,
        seed: None,
    }
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    for &n in &[100usize, 800, 5_000] {
        let fixed = config(n, Sizing::FixedAmount(10.0));
        group.bench_with_input(BenchmarkId::new("fixed", n), &fixed, |b, cfg| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| simulate(black_box(cfg), &mut rng).unwrap());
        });
        let percent = config(n, Sizing::PercentOfBalance(1.0));
        group.bench_with_input(BenchmarkId::new("percent", n), &percent, |b, cfg| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| simulate(black_box(cfg), &mut rng).unwrap());
        });
    }
    group.finish();
}

fn bench_streaks_and_replay(c: &mut Criterion) {
    let cfg = config(10_000, Sizing::FixedAmount(10.0));
    let run = simulate(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();

    c.bench_function("analyze_10k", |b| b.iter(|| analyze(black_box(&run.outcomes))));
    c.bench_function("replay_10k", |b| {
        b.iter(|| replay(black_box(&cfg), black_box(&run.outcomes)))
    });
}

criterion_group!(benches, bench_simulate, bench_streaks_and_replay);
criterion_main!(benches);
