//! Benchmarks for the automaton algorithms.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fsakit::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A random DFA with `states` states over `letters` letters
fn create_dfa(states: usize, letters: usize, seed: u64) -> Automaton {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fsa = Automaton::new(Alphabet::new(letters), letters, states + 1, StorageFormat::Default);
    for s in 1..=states as StateId {
        let row: Vec<StateId> = (0..letters)
            .map(|_| {
                if rng.gen_bool(0.8) {
                    rng.gen_range(1..=states as StateId)
                } else {
                    0
                }
            })
            .collect();
        fsa.set_transitions(s, &row).unwrap();
        if rng.gen_bool(0.3) {
            fsa.accepting_mut().include(s);
        }
    }
    fsa
}

/// Benchmark: minimisation of random DFAs
fn bench_minimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimize");
    let factory = Factory::default();

    for states in [100usize, 1000, 10_000].iter() {
        let fsa = create_dfa(*states, 4, 1);
        group.bench_with_input(BenchmarkId::from_parameter(states), states, |b, _| {
            b.iter(|| black_box(factory.minimize(black_box(&fsa)).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: subset construction from many initial states
fn bench_determinize(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinize");
    let factory = Factory::default();

    for states in [20usize, 60, 120].iter() {
        let mut fsa = create_dfa(*states, 3, 2);
        for s in (1..=*states as StateId).step_by(7) {
            fsa.initial_mut().include(s);
        }
        fsa.change_flags(Flags::MIDFA, Flags::DFA);
        group.bench_with_input(BenchmarkId::from_parameter(states), states, |b, _| {
            b.iter(|| black_box(factory.determinize(black_box(&fsa)).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: boolean combination of two DFAs
fn bench_binop(c: &mut Criterion) {
    let mut group = c.benchmark_group("binop");
    let factory = Factory::default();

    for states in [50usize, 200, 800].iter() {
        let a = create_dfa(*states, 3, 3);
        let b = create_dfa(*states, 3, 4);
        for kind in [BinopKind::And, BinopKind::Or, BinopKind::AndNot] {
            group.bench_with_input(BenchmarkId::new(kind.name(), states), states, |bench, _| {
                bench.iter(|| black_box(factory.binop(black_box(&a), black_box(&b), kind).unwrap()));
            });
        }
    }
    group.finish();
}

/// Benchmark: star and concatenation of word lists
fn bench_star_concat(c: &mut Criterion) {
    let mut group = c.benchmark_group("star_concat");
    let factory = Factory::default();
    let alphabet = Alphabet::new(3);
    let short = factory.all_words(&alphabet, 3).unwrap();
    let random = create_dfa(12, 3, 5);

    group.bench_function("star", |b| {
        b.iter(|| black_box(factory.star(black_box(&random)).unwrap()));
    });
    group.bench_function("concat", |b| {
        b.iter(|| black_box(factory.concat(black_box(&random), black_box(&short)).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_minimize, bench_determinize, bench_binop, bench_star_concat);
criterion_main!(benches);
