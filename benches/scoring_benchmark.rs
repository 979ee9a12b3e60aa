//! Benchmark of single-record scoring latency per model
//!
//! Run with: cargo bench --bench scoring_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use casaml::models::{ChurnBundle, ClusterBundle, PricingBundle};
use casaml::pipeline::estimators::{ForestParams, RandomForestRegressor};
use casaml::pipeline::synthetic::generate;
use casaml::{ModelKind, Record};

fn record(pairs: &[(&str, f64)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn bench_scoring(c: &mut Criterion) {
    let pricing = PricingBundle::train(&generate(ModelKind::Pricing, 1000, 42).unwrap()).unwrap();
    let churn = ChurnBundle::train(&generate(ModelKind::Churn, 1000, 42).unwrap()).unwrap();
    let clustering =
        ClusterBundle::train(&generate(ModelKind::Clustering, 1000, 42).unwrap()).unwrap();

    let pricing_record = record(&[
        ("locationScore", 7.5),
        ("squareMeters", 85.0),
        ("roomCount", 3.0),
        ("demandScore", 8.0),
        ("season", 1.0),
        ("currentPrice", 850.0),
    ]);
    let churn_record = record(&[
        ("daysSinceLastLogin", 2.0),
        ("daysActiveLastMonth", 25.0),
        ("totalPropertiesViewed", 50.0),
        ("messagesSent", 15.0),
    ]);
    let cluster_record = record(&[
        ("propertiesViewedMonthly", 45.0),
        ("msgResponseRate", 0.9),
        ("subscriptionTier", 2.0),
    ]);

    let mut group = c.benchmark_group("score");
    group.bench_function("pricing", |b| {
        b.iter(|| pricing.score(black_box(&pricing_record)))
    });
    group.bench_function("churn", |b| b.iter(|| churn.score(black_box(&churn_record))));
    group.bench_function("clustering", |b| {
        b.iter(|| clustering.score(black_box(&cluster_record)))
    });
    group.finish();
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit");
    group.sample_size(10);

    for n_rows in [250usize, 1000] {
        let table = generate(ModelKind::Pricing, n_rows, 42).unwrap();
        let labels = table.labels.clone().unwrap();
        let params = ForestParams {
            n_trees: 20,
            ..ForestParams::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n_rows), &n_rows, |b, _| {
            b.iter(|| RandomForestRegressor::fit(black_box(&table.features), &labels, &params))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scoring, bench_forest_fit);
criterion_main!(benches);
