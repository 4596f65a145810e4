// ABOUTME: Main library entry point for the Larder nutrition resolution engine
// ABOUTME: Provider fan-out, confidence ranking, fallback estimation, and usage metering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Larder
//!
//! Resolves a food description (free text, a barcode, or an image-recognition
//! guess) into canonical nutrition records drawn from several external
//! providers of differing shape and reliability, falling back to a metered
//! heuristic estimate when no provider has an acceptable answer.
//!
//! ## Architecture
//!
//! - **Providers** (`larder-providers`): USDA `FoodData` Central, Open Food
//!   Facts, and an image-guess table behind one `ProviderClient` trait
//! - **Resolution**: confidence normalization, deduplicating merge, fallback
//!   estimation, and the orchestrator driving them per request
//! - **Usage**: per-subject ledger metering fallback estimations, with TTL
//!   expiry and a background sweeper
//! - **Routes**: axum HTTP surface for resolution and usage management
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use larder::config::ResolverConfig;
//! use larder::models::FoodQuery;
//! use larder::providers::ProviderRegistry;
//! use larder::resolution::{ResolutionOrchestrator, ResolutionRequest};
//! use larder::usage::InMemoryUsageLedger;
//! use std::sync::Arc;
//!
//! # async fn example() -> larder::errors::AppResult<()> {
//! let config = ResolverConfig::default();
//! let ledger = Arc::new(InMemoryUsageLedger::new(&config));
//! let orchestrator = ResolutionOrchestrator::new(ProviderRegistry::new(), ledger, config);
//!
//! let resolution = orchestrator
//!     .resolve(&ResolutionRequest::new("guest-42", FoodQuery::text("banana")))
//!     .await?;
//! assert!(resolution.estimated);
//! # Ok(())
//! # }
//! ```

/// Environment-driven configuration
pub mod config;

/// Unified error handling re-exported from the core crate
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Resolution engine: normalizer, merger, estimator, orchestrator
pub mod resolution;

/// HTTP routes
pub mod routes;

/// Fallback usage metering
pub mod usage;

pub use larder_core::{constants, models, units};

/// Provider capability trait and implementations
pub use larder_providers as providers;
