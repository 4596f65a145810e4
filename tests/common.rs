// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Quiet logging setup plus builders for raw and resolved food records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `larder`

use larder::config::ResolverConfig;
use larder::models::{MatchSignal, NutritionFacts, ProviderId, RawResult, ResolvedFood};
use larder::providers::ProviderRegistry;
use larder::resolution::ResolutionOrchestrator;
use larder::usage::InMemoryUsageLedger;
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Nutrition facts with only calories and protein set
pub fn facts(calories: f64, protein_g: f64) -> NutritionFacts {
    NutritionFacts {
        calories: Some(calories),
        protein_g: Some(protein_g),
        ..NutritionFacts::default()
    }
}

/// Provider-native result for 100 g
pub fn raw(name: &str, brand: Option<&str>, signal: MatchSignal) -> RawResult {
    RawResult {
        name: name.to_owned(),
        brand: brand.map(str::to_owned),
        quantity: 100.0,
        unit: "g".to_owned(),
        nutrition: facts(60.0, 3.2),
        signal,
    }
}

/// Already-scored record for 100 g
pub fn resolved(
    name: &str,
    brand: Option<&str>,
    confidence: f64,
    source: ProviderId,
) -> ResolvedFood {
    ResolvedFood {
        name: name.to_owned(),
        brand: brand.map(str::to_owned),
        quantity: 100.0,
        unit: "g".to_owned(),
        nutrition: facts(60.0, 3.2),
        confidence,
        source,
    }
}

/// Orchestrator with default config and a fresh in-memory ledger
pub fn orchestrator(registry: ProviderRegistry) -> ResolutionOrchestrator {
    orchestrator_with(registry, ResolverConfig::default())
}

/// Orchestrator with an explicit config and a fresh in-memory ledger
pub fn orchestrator_with(
    registry: ProviderRegistry,
    config: ResolverConfig,
) -> ResolutionOrchestrator {
    init_test_logging();
    let ledger = Arc::new(InMemoryUsageLedger::new(&config));
    ResolutionOrchestrator::new(registry, ledger, config)
}
