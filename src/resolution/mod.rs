// ABOUTME: Nutrition resolution engine: confidence normalization, merging, estimation, orchestration
// ABOUTME: Turns provider answers into one ranked, comparable list or a metered estimate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Table-driven fallback estimates
pub mod estimator;
/// Ranking and deduplication
pub mod merger;
/// Provider-native signal to comparable confidence
pub mod normalizer;
/// Per-request state machine
pub mod orchestrator;

pub use estimator::FallbackEstimator;
pub use merger::merge;
pub use normalizer::normalize;
pub use orchestrator::{
    ProviderFailure, Resolution, ResolutionOrchestrator, ResolutionPhase, ResolutionRequest,
};
