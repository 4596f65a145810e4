// ABOUTME: AI-derived provider turning image-recognition guesses into nutrition records
// ABOUTME: Whole-word lookup in the reference macro table, passing the model confidence through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::core::ProviderClient;
use async_trait::async_trait;
use larder_core::errors::provider::ProviderResult;
use larder_core::models::{
    FoodQuery, ImageGuess, MatchSignal, Portion, ProviderId, QueryKind, RawResult, ReferenceFood,
    REFERENCE_FOODS,
};
use larder_core::units;
use std::time::Duration;

/// Answers image guesses from the static reference table
///
/// Matching is on whole words, so "grape" does not pick up "grapefruit".
/// Guesses outside the table yield no result and are left to the fallback
/// estimator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageGuessProvider;

impl ImageGuessProvider {
    /// Create the provider
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn lookup(name: &str) -> Option<&'static ReferenceFood> {
        let words: Vec<String> = name
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_owned)
            .collect();

        REFERENCE_FOODS.iter().find(|food| {
            let fragment: Vec<&str> = food.fragment.split(' ').collect();
            words
                .windows(fragment.len())
                .any(|window| window.iter().zip(&fragment).all(|(w, f)| singular(w) == *f))
        })
    }

    fn answer(guess: &ImageGuess) -> Option<RawResult> {
        let food = Self::lookup(&guess.name)?;
        let factor = units::per_100g_factor(guess.quantity, &guess.unit);
        let signal = guess
            .source_confidence
            .map_or(MatchSignal::Missing, |confidence| MatchSignal::SelfReported { confidence });

        Some(RawResult {
            name: guess.name.trim().to_owned(),
            brand: None,
            quantity: guess.quantity,
            unit: guess.unit.clone(),
            nutrition: food.profile.facts_for(factor),
            signal,
        })
    }
}

/// Plural-insensitive comparison form of a word
fn singular(word: &str) -> &str {
    word.strip_suffix("es")
        .filter(|stem| stem.ends_with("to") || stem.ends_with("ch"))
        .or_else(|| word.strip_suffix('s').filter(|stem| stem.len() > 2))
        .unwrap_or(word)
}

#[async_trait]
impl ProviderClient for ImageGuessProvider {
    fn id(&self) -> ProviderId {
        ProviderId::ImageGuess
    }

    fn supports(&self, kind: QueryKind) -> bool {
        kind == QueryKind::ImageGuess
    }

    async fn search(
        &self,
        query: &FoodQuery,
        _portion: &Portion,
        _timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>> {
        let FoodQuery::ImageGuess(guess) = query else {
            return Ok(Vec::new());
        };
        Ok(Self::answer(guess).into_iter().collect())
    }
}
