// ABOUTME: Core provider trait shared by every nutrition data source
// ABOUTME: Defines the search contract, query-kind support, and timeout hints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Provider Contract
//!
//! A [`ProviderClient`] wraps one external nutrition source. The contract:
//!
//! - `search` returns zero or more [`RawResult`]s whose nutrition values are
//!   already scaled to the requested [`Portion`]. An empty list means the
//!   source has no answer; it is not an error.
//! - Implementations must not block past `timeout`. The caller enforces the
//!   deadline independently, so a provider that overruns is cancelled and
//!   reported as [`ProviderError::Timeout`](crate::ProviderError::Timeout).
//! - Providers hold no state shared with other providers; network I/O is their
//!   only side effect (local caches aside).
//!
//! ## Example: Adding a New Provider
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use larder_core::errors::provider::ProviderResult;
//! use larder_core::models::{FoodQuery, Portion, ProviderId, QueryKind, RawResult};
//! use larder_providers::ProviderClient;
//! use std::time::Duration;
//!
//! struct PantryProvider;
//!
//! #[async_trait]
//! impl ProviderClient for PantryProvider {
//!     fn id(&self) -> ProviderId {
//!         ProviderId::OpenFoodFacts
//!     }
//!
//!     fn supports(&self, kind: QueryKind) -> bool {
//!         kind == QueryKind::Text
//!     }
//!
//!     async fn search(
//!         &self,
//!         _query: &FoodQuery,
//!         _portion: &Portion,
//!         _timeout: Duration,
//!     ) -> ProviderResult<Vec<RawResult>> {
//!         Ok(vec![])
//!     }
//! }
//! ```

use async_trait::async_trait;
use larder_core::errors::provider::ProviderResult;
use larder_core::models::{FoodQuery, Portion, ProviderId, QueryKind, RawResult};
use std::time::Duration;

/// Uniform interface over an external nutrition source
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider identity, which also fixes its reliability family
    fn id(&self) -> ProviderId;

    /// Whether this provider answers queries of `kind`
    fn supports(&self, kind: QueryKind) -> bool;

    /// Provider-specific deadline; `None` uses the resolver default
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Search the provider for `query`, scaling results to `portion`
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport failure, non-success status,
    /// rate limiting, an open circuit, or an unparseable response.
    async fn search(
        &self,
        query: &FoodQuery,
        portion: &Portion,
        timeout: Duration,
    ) -> ProviderResult<Vec<RawResult>>;
}
