// ABOUTME: HTTP route assembly for the Larder server
// ABOUTME: Shared resources, nutrition and health route groups, and the tracing layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP surface
//!
//! Route groups are plain structs exposing `routes(resources)`, merged into
//! one router by [`router`].

/// Liveness and readiness endpoints
pub mod health;
/// Resolution and usage endpoints
pub mod resolve;

pub use health::HealthRoutes;
pub use resolve::NutritionRoutes;

use crate::resolution::ResolutionOrchestrator;
use crate::usage::UsageLedger;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every handler
pub struct ResolverResources {
    /// Resolution engine
    pub orchestrator: ResolutionOrchestrator,
    /// Ledger backing the usage endpoints; the same one the orchestrator meters through
    pub ledger: Arc<dyn UsageLedger>,
}

impl ResolverResources {
    /// Resources around `orchestrator`, sharing its ledger
    #[must_use]
    pub fn new(orchestrator: ResolutionOrchestrator) -> Self {
        let ledger = orchestrator.ledger();
        Self {
            orchestrator,
            ledger,
        }
    }
}

/// Full application router
pub fn router(resources: Arc<ResolverResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(NutritionRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
}
