//! Engine throughput benchmarks.
//!
//! - One in-game day of ticks through `LifeEngine::update`
//! - Spirit-root grading
//! - Estate settlement with a large heirloom list

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use mirrorworld_core::engine::LifeEngine;
use mirrorworld_logic::elements::Affinities;
use mirrorworld_logic::inheritance::{settle_inheritance, Investment};
use mirrorworld_logic::rules::RuleTable;
use mirrorworld_logic::spirit_root::grade_spirit_root;
use mirrorworld_logic::state::Heirloom;

fn bench_day_of_ticks(c: &mut Criterion) {
    let rules = RuleTable::default();
    let seconds_per_day = rules.tick.ticks_per_day * rules.tick.seconds_per_tick;

    let mut group = c.benchmark_group("engine_update");
    group.throughput(Throughput::Elements(rules.tick.ticks_per_day as u64));
    group.bench_function("one_day", |b| {
        b.iter_batched(
            || LifeEngine::new(rules.clone()).unwrap(),
            |mut engine| black_box(engine.update(black_box(seconds_per_day))),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_grading(c: &mut Criterion) {
    let rules = RuleTable::default();
    let profiles = [
        Affinities::new(20.0, 10.0, 10.0, 10.0, 10.0),
        Affinities::new(0.0, 0.0, 96.0, 2.0, 2.0),
        Affinities::default(),
    ];
    c.bench_function("grade_spirit_root", |b| {
        b.iter(|| {
            for profile in &profiles {
                black_box(grade_spirit_root(&rules, black_box(profile)));
            }
        })
    });
}

fn bench_settlement(c: &mut Criterion) {
    let mut rules = RuleTable::default();
    rules.inheritance.heirloom_tax = 0.25;
    let heirlooms: Vec<Heirloom> = (0..1000)
        .map(|i| Heirloom::new(i, format!("heirloom-{}", i)))
        .collect();

    c.bench_function("settle_inheritance_1000_heirlooms", |b| {
        b.iter(|| {
            settle_inheritance(
                &rules,
                black_box(1_000_000),
                black_box(&heirlooms),
                Investment::new(90_000, 60_000),
            )
        })
    });
}

criterion_group!(benches, bench_day_of_ticks, bench_grading, bench_settlement);
criterion_main!(benches);
