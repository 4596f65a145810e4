// ABOUTME: Tests for the table-driven fallback nutrition estimator
// ABOUTME: Covers fragment matching order, default profile, scaling, and low confidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs, clippy::float_cmp)]

use larder::constants::{confidence, defaults};
use larder::models::{ProviderId, DEFAULT_PROFILE};
use larder::resolution::FallbackEstimator;
use larder::units::GRAMS_PER_OUNCE;

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn test_banana_profile_for_100g() {
    let food = FallbackEstimator::new().estimate("Banana", 100.0, "g");

    assert_eq!(food.name, "Banana");
    assert_eq!(food.source, ProviderId::Estimate);
    assert!(food.brand.is_none());
    assert!(close(food.nutrition.calories, 89.0));
    assert!(close(food.nutrition.carbs_g, 22.8));
}

#[test]
fn test_substring_match_scales_linearly() {
    let food = FallbackEstimator::new().estimate("ripe banana slices", 250.0, "g");
    assert!(close(food.nutrition.calories, 89.0 * 2.5));
    assert_eq!(food.quantity, 250.0);
    assert_eq!(food.unit, "g");
}

#[test]
fn test_ounces_convert_to_grams() {
    let food = FallbackEstimator::new().estimate("apple", 1.0, "oz");
    assert!(close(food.nutrition.calories, 52.0 * GRAMS_PER_OUNCE / 100.0));
}

#[test]
fn test_first_fragment_in_table_order_wins() {
    let estimator = FallbackEstimator::new();
    let peanut_butter = estimator.profile_for("Crunchy Peanut Butter");
    let butter = estimator.profile_for("salted butter");
    assert_eq!(peanut_butter.calories, 588.0);
    assert_eq!(butter.calories, 717.0);
}

#[test]
fn test_unknown_food_uses_default_profile() {
    let estimator = FallbackEstimator::new();
    assert_eq!(*estimator.profile_for("dragonfruit smoothie"), DEFAULT_PROFILE);

    let food = estimator.estimate("dragonfruit smoothie", 100.0, "g");
    assert!(close(food.nutrition.calories, DEFAULT_PROFILE.calories));
}

#[test]
fn test_confidence_below_acceptance_threshold() {
    let estimator = FallbackEstimator::new();
    for name in ["banana", "", "???", "chicken breast"] {
        let food = estimator.estimate(name, 1.0, "piece");
        assert_eq!(food.confidence, confidence::ESTIMATE);
        assert!(food.confidence < defaults::ACCEPT_THRESHOLD);
    }
}
