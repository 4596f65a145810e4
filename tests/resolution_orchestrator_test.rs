// ABOUTME: End-to-end tests for the resolution state machine with in-process providers
// ABOUTME: Covers acceptance, estimation, quota exhaustion, degraded providers, and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs, clippy::float_cmp)]

use larder::config::ResolverConfig;
use larder::errors::{ErrorCode, ProviderError, ProviderErrorKind};
use larder::models::{
    FoodQuery, ImageGuess, MatchSignal, NutritionFacts, Portion, ProviderId, QueryKind,
};
use larder::providers::{ImageGuessProvider, ProviderRegistry, StaticProvider};
use larder::resolution::ResolutionRequest;
use std::sync::Arc;
use std::time::Duration;

mod common;

use common::{orchestrator, orchestrator_with, raw};

fn request(query: FoodQuery) -> ResolutionRequest {
    ResolutionRequest::new("guest-42", query)
}

#[tokio::test]
async fn test_banana_with_no_providers_is_estimated() {
    let orchestrator = orchestrator(ProviderRegistry::new());

    let resolution = orchestrator
        .resolve(&request(FoodQuery::text("banana")))
        .await
        .unwrap();

    assert!(resolution.estimated);
    assert!(!resolution.quota_exceeded);
    let estimate = resolution.best().unwrap();
    assert_eq!(estimate.source, ProviderId::Estimate);
    assert_eq!(estimate.name, "banana");
    assert_eq!(estimate.nutrition.calories, Some(89.0));
}

#[tokio::test]
async fn test_barcode_exact_match_is_accepted() {
    let off = Arc::new(
        StaticProvider::new(ProviderId::OpenFoodFacts)
            .supporting(&[QueryKind::Barcode])
            .with_results(vec![raw(
                "Nutella",
                Some("Ferrero"),
                MatchSignal::ExactMatch,
            )]),
    );
    let usda = Arc::new(StaticProvider::new(ProviderId::Usda).supporting(&[QueryKind::Barcode]));
    let registry = ProviderRegistry::new()
        .with_provider(usda.clone())
        .with_provider(off.clone());

    let resolution = orchestrator(registry)
        .resolve(&request(FoodQuery::barcode("3017620422003")))
        .await
        .unwrap();

    assert!(!resolution.estimated);
    assert!(resolution.degraded.is_empty());
    let top = resolution.best().unwrap();
    assert_eq!(top.confidence, 1.0);
    assert_eq!(top.source, ProviderId::OpenFoodFacts);
    assert_eq!(usda.calls(), 1);
    assert_eq!(off.calls(), 1);
}

#[tokio::test]
async fn test_distinct_brands_rank_separately() {
    let usda = StaticProvider::new(ProviderId::Usda).with_results(vec![raw(
        "Whole Milk",
        Some("Meadow Farms"),
        MatchSignal::SelfReported { confidence: 0.9 },
    )]);
    let off = StaticProvider::new(ProviderId::OpenFoodFacts).with_results(vec![raw(
        "Whole Milk",
        Some("Acme Dairy"),
        MatchSignal::SelfReported { confidence: 0.7 },
    )]);
    let registry = ProviderRegistry::new()
        .with_provider(Arc::new(off))
        .with_provider(Arc::new(usda));

    let resolution = orchestrator(registry)
        .resolve(&request(FoodQuery::text("whole milk")))
        .await
        .unwrap();

    let confidences: Vec<f64> = resolution.results.iter().map(|f| f.confidence).collect();
    assert_eq!(confidences, vec![0.9, 0.7]);
}

#[tokio::test]
async fn test_slow_provider_is_dropped_as_degraded() {
    let slow = Arc::new(
        StaticProvider::new(ProviderId::OpenFoodFacts)
            .with_results(vec![raw("Apple", None, MatchSignal::ExactMatch)])
            .with_delay(Duration::from_secs(5))
            .with_timeout(Duration::from_millis(20)),
    );
    let fast = StaticProvider::new(ProviderId::Usda).with_results(vec![raw(
        "Apples, raw",
        None,
        MatchSignal::Rank { position: 0 },
    )]);
    let registry = ProviderRegistry::new()
        .with_provider(Arc::new(fast))
        .with_provider(slow.clone());

    let started = std::time::Instant::now();
    let resolution = orchestrator(registry)
        .resolve(&request(FoodQuery::text("apple")))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!resolution.estimated);
    assert_eq!(resolution.results.len(), 1);
    assert_eq!(resolution.results[0].source, ProviderId::Usda);
    assert_eq!(resolution.degraded.len(), 1);
    assert_eq!(resolution.degraded[0].provider, ProviderId::OpenFoodFacts);
    assert_eq!(resolution.degraded[0].kind, ProviderErrorKind::Timeout);
    assert_eq!(slow.calls(), 1);
}

#[tokio::test]
async fn test_failing_provider_falls_back_to_estimate() {
    let broken = StaticProvider::new(ProviderId::Usda)
        .failing(ProviderError::unreachable(ProviderId::Usda, "connection refused"));
    let registry = ProviderRegistry::new().with_provider(Arc::new(broken));

    let resolution = orchestrator(registry)
        .resolve(&request(FoodQuery::text("grilled salmon")))
        .await
        .unwrap();

    assert!(resolution.estimated);
    assert_eq!(resolution.degraded.len(), 1);
    assert_eq!(resolution.degraded[0].kind, ProviderErrorKind::Unreachable);
    assert_eq!(resolution.best().unwrap().nutrition.calories, Some(208.0));
}

#[tokio::test]
async fn test_quota_exhausted_returns_low_confidence_hits() {
    let weak = StaticProvider::new(ProviderId::OpenFoodFacts).with_results(vec![raw(
        "Rice cakes",
        None,
        MatchSignal::Rank { position: 6 },
    )]);
    let orchestrator = orchestrator(ProviderRegistry::new().with_provider(Arc::new(weak)));
    let req = request(FoodQuery::text("rice"));

    let first = orchestrator.resolve(&req).await.unwrap();
    assert!(first.estimated);
    assert_eq!(first.results.len(), 1, "low-confidence hits ride along");
    assert!(first.results[0].confidence < 0.6);

    let second = orchestrator.resolve(&req).await.unwrap();
    assert!(!second.estimated);
    assert!(second.quota_exceeded);
    assert!(second.estimate.is_none());
    assert_eq!(second.results.len(), 1);
    assert_eq!(second.best().unwrap().name, "Rice cakes");
}

#[tokio::test]
async fn test_quota_exhausted_without_hits_is_no_results() {
    let orchestrator = orchestrator(ProviderRegistry::new());
    let req = request(FoodQuery::text("mystery stew"));

    assert!(orchestrator.resolve(&req).await.unwrap().estimated);

    let error = orchestrator.resolve(&req).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::NoNutritionMatch);
    assert_eq!(error.details["quota_exceeded"], serde_json::json!(true));

    // Quota is per subject
    let other = ResolutionRequest::new("guest-43", FoodQuery::text("mystery stew"));
    assert!(orchestrator.resolve(&other).await.unwrap().estimated);
}

#[tokio::test]
async fn test_low_confidence_hits_can_be_suppressed() {
    let weak = StaticProvider::new(ProviderId::OpenFoodFacts).with_results(vec![raw(
        "Bread crumbs",
        None,
        MatchSignal::Missing,
    )]);
    let config = ResolverConfig {
        include_low_confidence_hits: false,
        ..ResolverConfig::default()
    };
    let orchestrator =
        orchestrator_with(ProviderRegistry::new().with_provider(Arc::new(weak)), config);

    let resolution = orchestrator
        .resolve(&request(FoodQuery::text("bread")))
        .await
        .unwrap();
    assert!(resolution.estimated);
    assert!(resolution.results.is_empty());
}

#[tokio::test]
async fn test_barcode_skips_text_only_providers() {
    let text_only = Arc::new(
        StaticProvider::new(ProviderId::Usda)
            .with_results(vec![raw("Anything", None, MatchSignal::ExactMatch)]),
    );
    let orchestrator = orchestrator(ProviderRegistry::new().with_provider(text_only.clone()));

    let resolution = orchestrator
        .resolve(&request(FoodQuery::barcode("5000112637922")))
        .await
        .unwrap();

    assert_eq!(text_only.calls(), 0);
    assert!(resolution.estimated);
    assert_eq!(resolution.best().unwrap().name, "5000112637922");
}

#[tokio::test]
async fn test_image_guess_uses_guessed_portion() {
    let registry = ProviderRegistry::new().with_provider(Arc::new(ImageGuessProvider::new()));
    let query = FoodQuery::ImageGuess(ImageGuess {
        name: "banana".into(),
        quantity: 120.0,
        unit: "g".into(),
        source_confidence: Some(0.82),
    });

    let resolution = orchestrator(registry)
        .resolve(&request(query).with_portion(Portion::new(1.0, "kg")))
        .await
        .unwrap();

    assert!(!resolution.estimated);
    let top = resolution.best().unwrap();
    assert_eq!(top.source, ProviderId::ImageGuess);
    assert_eq!(top.confidence, 0.82);
    assert_eq!(top.quantity, 120.0);
    assert!((top.nutrition.calories.unwrap() - 89.0 * 1.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_requested_portion_reaches_estimate() {
    let resolution = orchestrator(ProviderRegistry::new())
        .resolve(&request(FoodQuery::text("banana")).with_portion(Portion::new(200.0, "g")))
        .await
        .unwrap();

    let estimate = resolution.best().unwrap();
    assert_eq!(estimate.quantity, 200.0);
    assert_eq!(estimate.nutrition.calories, Some(178.0));
}

#[tokio::test]
async fn test_invalid_nutrients_are_dropped_before_ranking() {
    let mut bad = raw("Oat milk", Some("Oatly"), MatchSignal::ExactMatch);
    bad.nutrition = NutritionFacts {
        calories: Some(-40.0),
        fat_g: Some(f64::NAN),
        carbs_g: Some(6.7),
        ..NutritionFacts::default()
    };
    let provider = StaticProvider::new(ProviderId::OpenFoodFacts).with_results(vec![bad]);
    let resolution = orchestrator(ProviderRegistry::new().with_provider(Arc::new(provider)))
        .resolve(&request(FoodQuery::text("oat milk")))
        .await
        .unwrap();

    let top = resolution.best().unwrap();
    assert_eq!(top.nutrition.calories, None);
    assert_eq!(top.nutrition.fat_g, None);
    assert_eq!(top.nutrition.carbs_g, Some(6.7));
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_querying() {
    let provider = Arc::new(StaticProvider::new(ProviderId::Usda));
    let orchestrator = orchestrator(ProviderRegistry::new().with_provider(provider.clone()));

    let blank = orchestrator
        .resolve(&request(FoodQuery::text("   ")))
        .await
        .unwrap_err();
    assert_eq!(blank.code, ErrorCode::MissingRequiredField);

    let bad_barcode = orchestrator
        .resolve(&request(FoodQuery::barcode("12ab")))
        .await
        .unwrap_err();
    assert_eq!(bad_barcode.code, ErrorCode::InvalidInput);

    let bad_portion = orchestrator
        .resolve(&request(FoodQuery::text("rice")).with_portion(Portion::new(-1.0, "g")))
        .await
        .unwrap_err();
    assert_eq!(bad_portion.code, ErrorCode::ValueOutOfRange);

    let no_subject = orchestrator
        .resolve(&ResolutionRequest::new("", FoodQuery::text("rice")))
        .await
        .unwrap_err();
    assert_eq!(no_subject.code, ErrorCode::MissingRequiredField);

    assert_eq!(provider.calls(), 0);
}
