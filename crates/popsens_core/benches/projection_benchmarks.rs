//! Criterion benchmarks for popsens_core projection and analysis
//!
//! Run with: cargo bench -p popsens_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use popsens_core::analysis::{
    AnalysisOptions, EvaluationPlan, ParameterSpace, analyze, evaluate, saltelli_sample,
};
use popsens_core::model::{
    AGE_BRACKETS, CohortState, ParameterId, SENSITIVE_TRANSITIONS, Sex, VitalRates,
};
use popsens_core::projection::{ProjectionOptions, project, project_with};
use popsens_core::{FixedBounds, derive_baseline_rates};

fn create_pyramids() -> (CohortState, CohortState) {
    let previous_female: Vec<f64> = (0..AGE_BRACKETS)
        .map(|i| 5_000_000.0 - 230_000.0 * i as f64)
        .collect();
    let previous_male: Vec<f64> = previous_female.iter().map(|v| v * 1.03).collect();
    let current_female: Vec<f64> = previous_female.iter().map(|v| v * 0.99).collect();
    let current_male: Vec<f64> = previous_male.iter().map(|v| v * 0.985).collect();

    (
        CohortState::new(&previous_female, &previous_male).unwrap(),
        CohortState::new(&current_female, &current_male).unwrap(),
    )
}

fn create_bounds(rates: &VitalRates) -> FixedBounds {
    let fertility = rates.fertility();
    let mut bounds = FixedBounds::new()
        .with(ParameterId::Fertility, fertility * 0.85, fertility * 1.15)
        .with(ParameterId::FemaleShare, 0.47, 0.5);
    for sex in Sex::ALL {
        for bracket in SENSITIVE_TRANSITIONS {
            let rate = rates.survival(sex)[bracket];
            bounds.insert(ParameterId::Survival { sex, bracket }, rate * 0.95, rate * 1.05);
        }
    }
    bounds
}

fn bench_projection(c: &mut Criterion) {
    let (previous, current) = create_pyramids();
    let rates = derive_baseline_rates(&previous, &current).unwrap();

    c.bench_function("project_20_periods", |b| {
        b.iter(|| project(black_box(&current), black_box(&rates), black_box(20)))
    });

    c.bench_function("project_20_periods_legacy", |b| {
        b.iter(|| {
            project_with(
                black_box(&current),
                black_box(&rates),
                black_box(20),
                ProjectionOptions::legacy(),
            )
        })
    });
}

fn bench_batch_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_evaluate");
    let (previous, current) = create_pyramids();
    let rates = derive_baseline_rates(&previous, &current).unwrap();
    let space = ParameterSpace::standard(&create_bounds(&rates)).unwrap();
    let plan = EvaluationPlan::default();

    for n in [64, 256, 1024].iter() {
        let matrix = saltelli_sample(&space, *n, *n).unwrap();
        group.bench_with_input(BenchmarkId::new("base_samples", n), n, |b, _| {
            b.iter(|| {
                evaluate(
                    black_box(&current),
                    black_box(&rates),
                    black_box(&space),
                    black_box(&matrix),
                    black_box(&plan),
                )
            })
        });
    }

    group.finish();
}

fn bench_estimator(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator");
    let (previous, current) = create_pyramids();
    let rates = derive_baseline_rates(&previous, &current).unwrap();
    let space = ParameterSpace::standard(&create_bounds(&rates)).unwrap();
    let matrix = saltelli_sample(&space, 1024, 1024).unwrap();
    let outcomes = evaluate(&current, &rates, &space, &matrix, &EvaluationPlan::default()).unwrap();
    let series = &outcomes.series[3];

    for resamples in [0, 100].iter() {
        let options = AnalysisOptions {
            resamples: *resamples,
            seed: 0,
        };
        group.bench_with_input(BenchmarkId::new("resamples", resamples), resamples, |b, _| {
            b.iter(|| analyze(black_box(&space), black_box(series), black_box(&options)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_projection,
    bench_batch_evaluate,
    bench_estimator,
);
criterion_main!(benches);
