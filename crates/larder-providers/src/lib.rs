// ABOUTME: Nutrition data provider implementations for USDA, Open Food Facts, and image guesses
// ABOUTME: Core provider trait, circuit breaker, rate limiting, shared HTTP client, and registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition data provider implementations and core abstractions.
//!
//! Every external source implements [`ProviderClient`]. Providers translate
//! their native payloads into [`RawResult`](larder_core::models::RawResult)s
//! scaled to the caller's portion; confidence normalization and ranking are
//! the resolution engine's job.

pub use larder_core::constants;
pub use larder_core::errors;
pub use larder_core::models;

/// Circuit breaker pattern for provider resilience
pub mod circuit_breaker;
/// Core provider trait
pub mod core;
/// Shared HTTP client for provider API calls
pub mod http_client;
/// Reference-table provider for image-recognition guesses
pub mod image_guess;
/// Open Food Facts barcode and product search provider
pub mod open_food_facts;
/// Sliding-window request limiter
pub mod rate_limiter;
/// Ordered provider list built from configuration
pub mod registry;
/// In-process provider with canned answers
pub mod static_provider;
/// USDA `FoodData` Central search provider
pub mod usda;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use core::ProviderClient;
pub use http_client::{initialize_shared_client, shared_client};
pub use image_guess::ImageGuessProvider;
pub use larder_core::errors::provider::{ProviderError, ProviderErrorKind, ProviderResult};
pub use open_food_facts::{OpenFoodFactsConfig, OpenFoodFactsProvider};
pub use registry::{ProviderRegistry, ProviderSettings};
pub use static_provider::StaticProvider;
pub use usda::{UsdaConfig, UsdaProvider};
