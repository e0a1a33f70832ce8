//! Benchmarks for the trainers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kuhn_regret::cfr::{hedge, Algorithm, Trainer, TrainerConfig};
use kuhn_regret::games::kuhn::KuhnPoker;

fn kuhn_iteration_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("kuhn_single_iteration");
    for algorithm in Algorithm::ALL {
        let mut trainer = Trainer::new(KuhnPoker::default(), TrainerConfig::new(algorithm).with_seed(42));
        group.bench_with_input(BenchmarkId::from_parameter(algorithm), &algorithm, |b, _| {
            b.iter(|| black_box(trainer.run_iteration()))
        });
    }
    group.finish();
}

fn kuhn_1000_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("kuhn_1000_iterations", |b| {
        b.iter(|| {
            let mut trainer = Trainer::new(KuhnPoker::default(), TrainerConfig::cfr().with_seed(42));
            trainer.train(black_box(1000))
        })
    });
}

fn exploitability_benchmark(c: &mut Criterion) {
    let mut trainer = Trainer::new(KuhnPoker::default(), TrainerConfig::cfr_plus(0).with_seed(42));
    trainer.train(1000).unwrap();
    c.bench_function("kuhn_exploitability", |b| b.iter(|| black_box(trainer.exploitability())));
}

fn normal_hedge_scale_benchmark(c: &mut Criterion) {
    let regrets = [0.0, 1.5, 40.0, 0.25];
    c.bench_function("normal_hedge_solve_scale", |b| {
        b.iter(|| hedge::solve_scale(black_box(&regrets)))
    });
}

criterion_group!(
    benches,
    kuhn_iteration_benchmark,
    kuhn_1000_iterations_benchmark,
    exploitability_benchmark,
    normal_hedge_scale_benchmark
);
criterion_main!(benches);
