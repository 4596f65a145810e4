// ABOUTME: Last-resort nutrition estimate from the ordered reference macro table
// ABOUTME: First matching name fragment wins, otherwise a low default profile, at fixed low confidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::confidence;
use crate::models::{
    MacroProfile, ProviderId, ReferenceFood, ResolvedFood, DEFAULT_PROFILE, REFERENCE_FOODS,
};
use crate::units;

/// Table-driven estimator; has no failure mode
#[derive(Debug, Clone, Copy)]
pub struct FallbackEstimator {
    table: &'static [ReferenceFood],
    default_profile: MacroProfile,
}

impl Default for FallbackEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackEstimator {
    /// Estimator over the built-in reference table
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: REFERENCE_FOODS,
            default_profile: DEFAULT_PROFILE,
        }
    }

    /// Profile for `name`: the first table fragment contained in it, else the default
    #[must_use]
    pub fn profile_for(&self, name: &str) -> &MacroProfile {
        let name = name.to_lowercase();
        self.table
            .iter()
            .find(|food| name.contains(food.fragment))
            .map_or(&self.default_profile, |food| &food.profile)
    }

    /// Estimate nutrition for `quantity` `unit` of `name`
    ///
    /// Per-100g values scale linearly with the portion's weight in grams;
    /// count units (piece, serving) weigh one default serving each.
    #[must_use]
    pub fn estimate(&self, name: &str, quantity: f64, unit: &str) -> ResolvedFood {
        let factor = units::per_100g_factor(quantity, unit);
        ResolvedFood {
            name: name.trim().to_owned(),
            brand: None,
            quantity,
            unit: unit.to_owned(),
            nutrition: self.profile_for(name).facts_for(factor),
            confidence: confidence::ESTIMATE,
            source: ProviderId::Estimate,
        }
    }
}
