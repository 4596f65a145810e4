// ABOUTME: Core data models for nutrition resolution
// ABOUTME: Queries, canonical nutrition records, provider identity, and usage records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Food queries and canonical nutrition records
pub mod food;
/// Provider identity, families, and raw provider results
pub mod provider;
/// Static per-100g macro profiles keyed by food-name fragments
pub mod reference;
/// Fallback usage metering records
pub mod usage;

pub use food::{FoodQuery, ImageGuess, NutritionFacts, Portion, QueryKind, ResolvedFood};
pub use provider::{MatchSignal, ProviderFamily, ProviderId, RawResult};
pub use reference::{MacroProfile, ReferenceFood, DEFAULT_PROFILE, REFERENCE_FOODS};
pub use usage::{UsageRecord, UsageSnapshot};
