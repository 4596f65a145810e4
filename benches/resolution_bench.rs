// ABOUTME: Criterion benchmarks for ranking, deduplication, and full resolution
// ABOUTME: Measures merge cost across result-set sizes and an estimate-path resolve
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the resolution engine.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use larder::config::ResolverConfig;
use larder::models::{FoodQuery, NutritionFacts, ProviderId, ResolvedFood};
use larder::providers::ProviderRegistry;
use larder::resolution::{merge, ResolutionOrchestrator, ResolutionRequest};
use larder::usage::InMemoryUsageLedger;
use std::sync::Arc;
use tokio::runtime::Runtime;

const SOURCES: [ProviderId; 3] = [
    ProviderId::Usda,
    ProviderId::OpenFoodFacts,
    ProviderId::ImageGuess,
];

/// `count` records where roughly a third share a name with an earlier one
fn generate_results(count: usize) -> Vec<ResolvedFood> {
    (0..count)
        .map(|i| ResolvedFood {
            name: format!("Food item {}", i % (count * 2 / 3 + 1)),
            brand: (i % 4 == 0).then(|| format!("Brand {}", i % 7)),
            quantity: 100.0,
            unit: "g".to_owned(),
            nutrition: NutritionFacts {
                calories: Some(50.0 + i as f64),
                ..NutritionFacts::default()
            },
            confidence: ((i * 37) % 100) as f64 / 100.0,
            source: SOURCES[i % SOURCES.len()],
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for size in [10_usize, 100, 1_000] {
        let results = generate_results(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &results, |b, results| {
            b.iter(|| merge(black_box(results.clone())));
        });
    }
    group.finish();
}

fn bench_resolve_estimate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let config = ResolverConfig {
        free_fallback_quota: u32::MAX,
        ..ResolverConfig::default()
    };
    let ledger = Arc::new(InMemoryUsageLedger::new(&config));
    let orchestrator = ResolutionOrchestrator::new(ProviderRegistry::new(), ledger, config);
    let request = ResolutionRequest::new("bench-subject", FoodQuery::text("chicken breast"));

    c.bench_function("resolve_estimate_path", |b| {
        b.to_async(&rt)
            .iter(|| async { orchestrator.resolve(black_box(&request)).await.unwrap() });
    });
}

criterion_group!(benches, bench_merge, bench_resolve_estimate);
criterion_main!(benches);
