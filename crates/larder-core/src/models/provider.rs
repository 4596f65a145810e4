// ABOUTME: Provider identity, family, and raw result models
// ABOUTME: RawResult carries provider-native fields plus an optional match-quality signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::food::NutritionFacts;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reliability family of a provider, ordered from most to least trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// Curated, structured reference databases
    Authoritative,
    /// Crowd-sourced free-text and brand databases
    Community,
    /// Values derived from machine-learning guesses
    AiDerived,
    /// Heuristic table estimate
    Estimate,
}

/// Identifier of a nutrition source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// USDA `FoodData` Central
    Usda,
    /// Open Food Facts product database
    OpenFoodFacts,
    /// Reference-table lookup of image-recognition guesses
    ImageGuess,
    /// Fallback heuristic estimator
    Estimate,
}

impl ProviderId {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usda => "usda",
            Self::OpenFoodFacts => "open_food_facts",
            Self::ImageGuess => "image_guess",
            Self::Estimate => "estimate",
        }
    }

    /// Reliability family
    #[must_use]
    pub const fn family(self) -> ProviderFamily {
        match self {
            Self::Usda => ProviderFamily::Authoritative,
            Self::OpenFoodFacts => ProviderFamily::Community,
            Self::ImageGuess => ProviderFamily::AiDerived,
            Self::Estimate => ProviderFamily::Estimate,
        }
    }

    /// Tie-break priority; lower sorts first
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self.family() {
            ProviderFamily::Authoritative => 0,
            ProviderFamily::Community => 1,
            ProviderFamily::AiDerived => 2,
            ProviderFamily::Estimate => 3,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "usda" | "fdc" => Ok(Self::Usda),
            "open_food_facts" | "openfoodfacts" | "off" => Ok(Self::OpenFoodFacts),
            "image_guess" | "image" => Ok(Self::ImageGuess),
            other => Err(AppError::config(format!("Unknown provider '{other}'"))),
        }
    }
}

/// Native match-quality signal exposed by a provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchSignal {
    /// Exact identifier hit (barcode lookup)
    ExactMatch,
    /// Zero-based position in the provider's own relevance ordering
    Rank {
        /// Position, 0 = most relevant
        position: usize,
    },
    /// Confidence reported by an upstream model
    SelfReported {
        /// Reported value, possibly out of range
        confidence: f64,
    },
    /// Provider exposes no signal for this result
    Missing,
}

/// Provider-native result before confidence normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Food name as reported by the provider
    pub name: String,
    /// Brand, if the provider reports one
    pub brand: Option<String>,
    /// Portion amount `nutrition` refers to
    pub quantity: f64,
    /// Unit of `quantity`
    pub unit: String,
    /// Nutrition values already scaled to `quantity`/`unit`
    pub nutrition: NutritionFacts,
    /// Native match-quality signal
    pub signal: MatchSignal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("usda".parse::<ProviderId>().unwrap(), ProviderId::Usda);
        assert_eq!(
            "Open-Food-Facts".parse::<ProviderId>().unwrap(),
            ProviderId::OpenFoodFacts
        );
        assert_eq!("image".parse::<ProviderId>().unwrap(), ProviderId::ImageGuess);
        assert!("estimate".parse::<ProviderId>().is_err());
        assert!("myfitnesspal".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_priority_follows_family() {
        assert!(ProviderId::Usda.priority() < ProviderId::OpenFoodFacts.priority());
        assert!(ProviderId::OpenFoodFacts.priority() < ProviderId::ImageGuess.priority());
        assert!(ProviderId::ImageGuess.priority() < ProviderId::Estimate.priority());
    }
}
