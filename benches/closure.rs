use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use omega_membership::{
    congruence::{evaluate_regex, star_closure},
    prelude::*,
    random::{generate_random_automaton, generate_random_regex},
};

fn bench_star_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("star_closure");
    fastrand::seed(1);

    for size in [2, 4, 6, 8] {
        let table = TransitionTable::compile(&generate_random_automaton(2, size));
        let base: TransformSet = table.symbol_transforms().collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &base, |bench, base| {
            bench.iter(|| black_box(star_closure(black_box(base), size)));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    fastrand::seed(2);

    for size in [3, 6, 9] {
        let automaton = generate_random_automaton(3, size);
        let table = TransitionTable::compile(&automaton);
        let prefix = generate_random_regex(automaton.alphabet(), 4);
        let omega = generate_random_regex(automaton.alphabet(), 3);
        let word = ParsedOmegaWord::new(Some(prefix), omega);

        group.bench_with_input(
            BenchmarkId::new("regex", size),
            &word,
            |bench, word| {
                bench.iter(|| black_box(evaluate_regex(black_box(word.omega()), &table)));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("decision", size),
            &word,
            |bench, word| {
                bench.iter(|| black_box(evaluate(&automaton, black_box(word))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_star_closure, bench_evaluate);
criterion_main!(benches);
