// ABOUTME: In-process provider returning canned results with optional delay or failure
// ABOUTME: Used for local development without API keys and for deterministic resolution tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::core::ProviderClient;
use async_trait::async_trait;
use larder_core::errors::provider::{ProviderError, ProviderResult};
use larder_core::models::{FoodQuery, Portion, ProviderId, QueryKind, RawResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Provider with fixed answers
///
/// Answers every supported query with the same results. A configured delay
/// is slept before answering, which lets tests exercise caller-side timeouts.
pub struct StaticProvider {
    id: ProviderId,
    kinds: Vec<QueryKind>,
    results: Vec<RawResult>,
    delay: Option<Duration>,
    timeout: Option<Duration>,
    failure: Option<ProviderError>,
    calls: AtomicUsize,
}

impl StaticProvider {
    /// Provider answering text queries with no results
    #[must_use]
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            kinds: vec![QueryKind::Text],
            results: Vec::new(),
            delay: None,
            timeout: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the supported query kinds
    #[must_use]
    pub fn supporting(mut self, kinds: &[QueryKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    /// Canned results
    #[must_use]
    pub fn with_results(mut self, results: Vec<RawResult>) -> Self {
        self.results = results;
        self
    }

    /// Sleep before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Provider-specific deadline hint
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fail every search with `error`
    #[must_use]
    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of searches started
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for StaticProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn supports(&self, kind: QueryKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn search(
        &self,
        _query: &FoodQuery,
        _portion: &Portion,
        _timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.results.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::models::{MatchSignal, NutritionFacts};

    #[tokio::test]
    async fn test_canned_answers_and_call_count() {
        let provider = StaticProvider::new(ProviderId::Usda).with_results(vec![RawResult {
            name: "Oats".into(),
            brand: None,
            quantity: 40.0,
            unit: "g".into(),
            nutrition: NutritionFacts {
                calories: Some(155.6),
                ..NutritionFacts::default()
            },
            signal: MatchSignal::Rank { position: 0 },
        }]);

        let results = provider
            .search(&FoodQuery::text("oats"), &Portion::default(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(provider.calls(), 1);
        assert!(!provider.supports(QueryKind::Barcode));
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = StaticProvider::new(ProviderId::OpenFoodFacts)
            .failing(ProviderError::unreachable(ProviderId::OpenFoodFacts, "dns"));
        let error = provider
            .search(&FoodQuery::text("milk"), &Portion::default(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(error.provider(), ProviderId::OpenFoodFacts);
    }
}
