// ABOUTME: Per-request resolution state machine over providers, merger, ledger, and estimator
// ABOUTME: Fans out to applicable providers concurrently, ranks, then accepts or falls back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Resolution orchestrator
//!
//! Each call walks `Querying -> Merging -> (Accepted | Estimating) -> Done`
//! and keeps no state between calls.
//!
//! Providers applicable to the query kind run concurrently, each under its own
//! deadline enforced here rather than by the provider. The orchestrator waits
//! for every call to settle before merging; failures are dropped and reported
//! in [`Resolution::degraded`].

use super::estimator::FallbackEstimator;
use super::{merger, normalizer};
use crate::config::ResolverConfig;
use crate::errors::{AppError, AppResult, ProviderError, ProviderErrorKind};
use crate::logging::ResolutionLogger;
use crate::models::{FoodQuery, Portion, ProviderId, RawResult, ResolvedFood};
use crate::providers::{ProviderClient, ProviderRegistry};
use crate::usage::{validate_subject_key, UsageLedger};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Name used for an estimate when the query carries no food name
const UNKNOWN_FOOD: &str = "Unknown food";

/// States a resolution passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    /// Provider fan-out in flight
    Querying,
    /// Normalizing and ranking provider results
    Merging,
    /// Top result met the acceptance threshold
    Accepted,
    /// Falling back to the estimator (quota permitting)
    Estimating,
    /// Terminal
    Done,
}

impl fmt::Display for ResolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Querying => "querying",
            Self::Merging => "merging",
            Self::Accepted => "accepted",
            Self::Estimating => "estimating",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// One resolution request
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRequest {
    /// Guest session id or user id supplied by the caller
    pub subject_key: String,
    /// What to resolve
    pub query: FoodQuery,
    /// Requested portion for text and barcode queries
    pub portion: Option<Portion>,
}

impl ResolutionRequest {
    /// Request with the default portion
    #[must_use]
    pub fn new(subject_key: impl Into<String>, query: FoodQuery) -> Self {
        Self {
            subject_key: subject_key.into(),
            query,
            portion: None,
        }
    }

    /// Set the requested portion
    #[must_use]
    pub fn with_portion(mut self, portion: Portion) -> Self {
        self.portion = Some(portion);
        self
    }

    /// Validate subject, query, and portion
    ///
    /// # Errors
    ///
    /// Returns a validation `AppError` describing the first problem found.
    pub fn validate(&self) -> AppResult<()> {
        validate_subject_key(&self.subject_key)?;
        self.query.validate()?;
        if let Some(portion) = &self.portion {
            portion.validate()?;
        }
        Ok(())
    }

    /// Portion providers and the estimator should report for
    ///
    /// An image guess carries its own quantity and unit.
    #[must_use]
    pub fn effective_portion(&self) -> Portion {
        match &self.query {
            FoodQuery::ImageGuess(guess) => Portion::new(guess.quantity, guess.unit.clone()),
            FoodQuery::Text { .. } | FoodQuery::Barcode { .. } => {
                self.portion.clone().unwrap_or_default()
            }
        }
    }

    fn estimate_name(&self) -> &str {
        match &self.query {
            FoodQuery::Barcode { barcode } if !barcode.trim().is_empty() => barcode.trim(),
            query => query
                .food_name()
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_FOOD),
        }
    }
}

/// A provider dropped from a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider that failed
    pub provider: ProviderId,
    /// Failure class
    pub kind: ProviderErrorKind,
    /// Human-readable cause
    pub message: String,
}

impl From<&ProviderError> for ProviderFailure {
    fn from(error: &ProviderError) -> Self {
        Self {
            provider: error.provider(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Ranked, deduplicated provider results
    pub results: Vec<ResolvedFood>,
    /// Fallback estimate, when one was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<ResolvedFood>,
    /// Whether the answer is an estimate rather than a lookup
    pub estimated: bool,
    /// Whether an estimate was needed but the subject's quota is spent
    pub quota_exceeded: bool,
    /// Providers that failed during this request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<ProviderFailure>,
}

impl Resolution {
    /// The single best answer: the estimate when estimated, else the top result
    #[must_use]
    pub fn best(&self) -> Option<&ResolvedFood> {
        if self.estimated {
            self.estimate.as_ref()
        } else {
            self.results.first()
        }
    }
}

/// Resolves food queries into ranked canonical nutrition records
#[derive(Clone)]
pub struct ResolutionOrchestrator {
    registry: ProviderRegistry,
    ledger: Arc<dyn UsageLedger>,
    estimator: FallbackEstimator,
    config: ResolverConfig,
}

impl ResolutionOrchestrator {
    /// Orchestrator over `registry`, metering fallbacks through `ledger`
    #[must_use]
    pub fn new(
        registry: ProviderRegistry,
        ledger: Arc<dyn UsageLedger>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            estimator: FallbackEstimator::new(),
            config,
        }
    }

    /// Resolver configuration in use
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Providers consulted by this orchestrator
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Usage ledger metering fallback estimates
    #[must_use]
    pub fn ledger(&self) -> Arc<dyn UsageLedger> {
        Arc::clone(&self.ledger)
    }

    /// Resolve one request
    ///
    /// Provider failures never surface here; they are listed in
    /// [`Resolution::degraded`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, and `NO_NUTRITION_MATCH`
    /// when no provider matched and the subject's fallback quota is spent.
    pub async fn resolve(&self, request: &ResolutionRequest) -> AppResult<Resolution> {
        request.validate()?;
        let started = Instant::now();
        let query_kind = request.query.kind();
        let portion = request.effective_portion();

        debug!(phase = %ResolutionPhase::Querying, query.kind = %query_kind, "Resolution phase");
        let (raw, degraded) = self.query_providers(&request.query, &portion).await;

        debug!(phase = %ResolutionPhase::Merging, raw_results = raw.len(), "Resolution phase");
        let results = merger::merge(
            raw.into_iter()
                .map(|(provider, raw)| normalizer::resolve(raw, provider))
                .collect(),
        );

        let top = results.first().map_or(0.0, |food| food.confidence);
        let resolution = if top >= self.config.accept_threshold {
            debug!(phase = %ResolutionPhase::Accepted, top_confidence = top, "Resolution phase");
            Resolution {
                results,
                estimate: None,
                estimated: false,
                quota_exceeded: false,
                degraded,
            }
        } else {
            debug!(phase = %ResolutionPhase::Estimating, top_confidence = top, "Resolution phase");
            self.estimate_or_degrade(request, &portion, results, degraded)
                .await?
        };

        debug!(phase = %ResolutionPhase::Done, "Resolution phase");
        ResolutionLogger::log_resolution(
            query_kind,
            resolution.results.len(),
            resolution.estimated,
            resolution.quota_exceeded,
            resolution.degraded.len(),
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        Ok(resolution)
    }

    async fn estimate_or_degrade(
        &self,
        request: &ResolutionRequest,
        portion: &Portion,
        results: Vec<ResolvedFood>,
        degraded: Vec<ProviderFailure>,
    ) -> AppResult<Resolution> {
        let allowed = match self.ledger.try_consume(&request.subject_key).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!(subject = %request.subject_key, error = %e, "Usage ledger unavailable, denying estimate");
                false
            }
        };
        ResolutionLogger::log_quota_decision(&request.subject_key, allowed);

        if allowed {
            let estimate =
                self.estimator
                    .estimate(request.estimate_name(), portion.quantity, &portion.unit);
            let results = if self.config.include_low_confidence_hits {
                results
            } else {
                Vec::new()
            };
            return Ok(Resolution {
                results,
                estimate: Some(estimate),
                estimated: true,
                quota_exceeded: false,
                degraded,
            });
        }

        if results.is_empty() {
            return Err(AppError::no_results(true));
        }
        Ok(Resolution {
            results,
            estimate: None,
            estimated: false,
            quota_exceeded: true,
            degraded,
        })
    }

    async fn query_providers(
        &self,
        query: &FoodQuery,
        portion: &Portion,
    ) -> (Vec<(ProviderId, RawResult)>, Vec<ProviderFailure>) {
        let providers = self.registry.applicable(query.kind());
        let calls = providers
            .iter()
            .map(|provider| self.call_provider(provider.as_ref(), query, portion));
        let outcomes = join_all(calls).await;

        let mut raw = Vec::new();
        let mut degraded = Vec::new();
        for (provider, outcome) in providers.iter().zip(outcomes) {
            match outcome {
                Ok(results) => {
                    let id = provider.id();
                    raw.extend(results.into_iter().map(|result| (id, sanitize(id, result))));
                }
                Err(e) => {
                    ResolutionLogger::log_degraded(e.provider(), e.kind(), &e.to_string());
                    degraded.push(ProviderFailure::from(&e));
                }
            }
        }
        (raw, degraded)
    }

    async fn call_provider(
        &self,
        provider: &dyn ProviderClient,
        query: &FoodQuery,
        portion: &Portion,
    ) -> Result<Vec<RawResult>, ProviderError> {
        let timeout = provider
            .timeout()
            .unwrap_or(self.config.per_provider_timeout);
        tokio::time::timeout(timeout, provider.search(query, portion, timeout))
            .await
            .unwrap_or_else(|_| Err(ProviderError::timeout(provider.id(), timeout)))
    }
}

fn sanitize(provider: ProviderId, mut raw: RawResult) -> RawResult {
    let (nutrition, dropped) = raw.nutrition.sanitized();
    if dropped > 0 {
        warn!(
            provider = %provider,
            food = %raw.name,
            dropped,
            "Dropped negative or non-finite nutrient values"
        );
    }
    raw.nutrition = nutrition;
    raw
}
