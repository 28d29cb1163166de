//! Tick throughput benchmarks
//!
//! Measures the per-tick systems at growing roster sizes.
//!
//! Run with: cargo bench --bench tick_throughput

use std::time::Duration;

use assist_arena::config::SimConfig;
use assist_arena::game::state::{GameState, TickEffects};
use assist_arena::game::systems::{combat, mortality, steering};
use assist_arena::game::tournament::Tournament;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Config that never ends a game, so state stays comparable across iterations
fn endless_config(players_per_team: usize) -> SimConfig {
    SimConfig {
        players_per_team,
        arena_size: 2000.0,
        hit_probability: 0.0,
        game_length: Duration::from_secs(3600),
        ..SimConfig::default()
    }
}

fn bench_steering(c: &mut Criterion) {
    let mut group = c.benchmark_group("steering");
    group.sample_size(50);

    for per_team in [4, 64, 256, 1024] {
        let config = endless_config(per_team);
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GameState::spawn(&config, 0, &mut rng);
        let mut effects = TickEffects::default();

        group.throughput(Throughput::Elements(config.roster_size() as u64));
        group.bench_with_input(BenchmarkId::new("parallel", per_team * 2), &per_team, |b, _| {
            b.iter(|| {
                steering::update(&mut state, &config, &mut effects, &mut rng);
                black_box(&state);
            })
        });
    }
    group.finish();
}

fn bench_combat(c: &mut Criterion) {
    let mut group = c.benchmark_group("combat");
    group.sample_size(50);

    for per_team in [4, 64, 256, 1024] {
        let config = endless_config(per_team);
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = GameState::spawn(&config, 0, &mut rng);
        let mut effects = TickEffects::default();

        group.throughput(Throughput::Elements(config.roster_size() as u64));
        group.bench_with_input(BenchmarkId::new("targeting", per_team * 2), &per_team, |b, _| {
            b.iter(|| {
                black_box(combat::update(&mut state, &config, &mut effects, &mut rng));
                black_box(mortality::update(&mut state, &mut effects));
            })
        });
    }
    group.finish();
}

fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");

    for per_team in [4, 64, 256] {
        let mut tournament =
            Tournament::with_rng(endless_config(per_team), StdRng::seed_from_u64(3)).unwrap();
        tournament.start().unwrap();

        group.throughput(Throughput::Elements(per_team as u64 * 2));
        group.bench_with_input(BenchmarkId::new("tournament", per_team * 2), &per_team, |b, _| {
            b.iter(|| black_box(tournament.tick()))
        });
    }
    group.finish();
}

fn bench_tournament(c: &mut Criterion) {
    let mut group = c.benchmark_group("tournament");
    group.sample_size(10);

    let config = SimConfig {
        total_games: 10,
        ..SimConfig::default()
    };
    group.bench_function("ten_default_games", |b| {
        b.iter_batched(
            || Tournament::with_rng(config.clone(), StdRng::seed_from_u64(4)).unwrap(),
            |mut tournament| {
                black_box(tournament.run_to_completion().map(|h| h.len()).unwrap_or(0));
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_steering, bench_combat, bench_full_tick, bench_tournament);

criterion_main!(benches);
