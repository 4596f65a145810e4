// ABOUTME: Static per-100g macro profiles keyed by common food-name fragments
// ABOUTME: Ordered table shared by the image-guess provider and the fallback estimator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Reference macro table
//!
//! Values are per 100 g edible portion, rounded from USDA SR Legacy entries.
//! The table is evaluated top to bottom and the first matching fragment wins,
//! so compound names ("peanut butter", "sweet potato") are listed before the
//! plain fragments they contain ("butter", "potato").

use super::food::NutritionFacts;

/// Macro profile per 100 g
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroProfile {
    /// kcal
    pub calories: f64,
    /// g
    pub protein_g: f64,
    /// g
    pub carbs_g: f64,
    /// g
    pub fat_g: f64,
    /// g
    pub fiber_g: f64,
    /// mg
    pub sodium_mg: f64,
    /// g
    pub sugar_g: f64,
    /// g
    pub saturated_fat_g: f64,
}

impl MacroProfile {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        calories: f64,
        protein_g: f64,
        carbs_g: f64,
        fat_g: f64,
        fiber_g: f64,
        sodium_mg: f64,
        sugar_g: f64,
        saturated_fat_g: f64,
    ) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g,
            sodium_mg,
            sugar_g,
            saturated_fat_g,
        }
    }

    /// Nutrition facts for `factor` × 100 g
    #[must_use]
    pub fn facts_for(&self, factor: f64) -> NutritionFacts {
        NutritionFacts {
            calories: Some(self.calories),
            protein_g: Some(self.protein_g),
            carbs_g: Some(self.carbs_g),
            fat_g: Some(self.fat_g),
            fiber_g: Some(self.fiber_g),
            sodium_mg: Some(self.sodium_mg),
            sugar_g: Some(self.sugar_g),
            saturated_fat_g: Some(self.saturated_fat_g),
        }
        .scaled(factor)
    }
}

/// One table row
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFood {
    /// Lowercase name fragment
    pub fragment: &'static str,
    /// Profile per 100 g
    pub profile: MacroProfile,
}

const fn row(fragment: &'static str, profile: MacroProfile) -> ReferenceFood {
    ReferenceFood { fragment, profile }
}

/// Profile used when no fragment matches
pub const DEFAULT_PROFILE: MacroProfile =
    MacroProfile::new(100.0, 4.0, 15.0, 3.0, 1.0, 50.0, 3.0, 1.0);

/// Ordered reference table, first match wins
pub const REFERENCE_FOODS: &[ReferenceFood] = &[
    row("peanut butter", MacroProfile::new(588.0, 25.1, 20.0, 50.4, 6.0, 426.0, 9.2, 10.3)),
    row("almond milk", MacroProfile::new(15.0, 0.6, 0.6, 1.2, 0.2, 72.0, 0.0, 0.1)),
    row("chicken breast", MacroProfile::new(165.0, 31.0, 0.0, 3.6, 0.0, 74.0, 0.0, 1.0)),
    row("sweet potato", MacroProfile::new(86.0, 1.6, 20.1, 0.1, 3.0, 55.0, 4.2, 0.0)),
    row("brown rice", MacroProfile::new(123.0, 2.7, 25.6, 1.0, 1.6, 4.0, 0.2, 0.3)),
    row("banana", MacroProfile::new(89.0, 1.1, 22.8, 0.3, 2.6, 1.0, 12.2, 0.1)),
    row("apple", MacroProfile::new(52.0, 0.3, 13.8, 0.2, 2.4, 1.0, 10.4, 0.0)),
    row("orange", MacroProfile::new(47.0, 0.9, 11.8, 0.1, 2.4, 0.0, 9.4, 0.0)),
    row("avocado", MacroProfile::new(160.0, 2.0, 8.5, 14.7, 6.7, 7.0, 0.7, 2.1)),
    row("broccoli", MacroProfile::new(34.0, 2.8, 6.6, 0.4, 2.6, 33.0, 1.7, 0.0)),
    row("salad", MacroProfile::new(20.0, 1.5, 3.5, 0.2, 1.8, 30.0, 1.5, 0.0)),
    row("salmon", MacroProfile::new(208.0, 20.4, 0.0, 13.4, 0.0, 59.0, 0.0, 3.1)),
    row("chicken", MacroProfile::new(239.0, 27.3, 0.0, 13.6, 0.0, 82.0, 0.0, 3.8)),
    row("beef", MacroProfile::new(250.0, 26.0, 0.0, 15.0, 0.0, 72.0, 0.0, 6.0)),
    row("cheese", MacroProfile::new(402.0, 25.0, 1.3, 33.0, 0.0, 621.0, 0.5, 21.0)),
    row("yogurt", MacroProfile::new(61.0, 3.5, 4.7, 3.3, 0.0, 46.0, 4.7, 2.1)),
    row("milk", MacroProfile::new(61.0, 3.2, 4.8, 3.3, 0.0, 43.0, 5.1, 1.9)),
    row("butter", MacroProfile::new(717.0, 0.9, 0.1, 81.1, 0.0, 11.0, 0.1, 51.4)),
    row("egg", MacroProfile::new(155.0, 12.6, 1.1, 10.6, 0.0, 124.0, 1.1, 3.3)),
    row("pizza", MacroProfile::new(266.0, 11.0, 33.0, 10.0, 2.3, 598.0, 3.6, 4.5)),
    row("pasta", MacroProfile::new(131.0, 5.0, 25.0, 1.1, 1.8, 1.0, 0.6, 0.2)),
    row("bread", MacroProfile::new(265.0, 9.0, 49.0, 3.2, 2.7, 491.0, 5.0, 0.7)),
    row("rice", MacroProfile::new(130.0, 2.7, 28.2, 0.3, 0.4, 1.0, 0.1, 0.1)),
    row("potato", MacroProfile::new(77.0, 2.0, 17.0, 0.1, 2.2, 6.0, 0.8, 0.0)),
    row("oat", MacroProfile::new(389.0, 16.9, 66.3, 6.9, 10.6, 2.0, 1.0, 1.2)),
];
