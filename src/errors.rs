// ABOUTME: Error type re-exports for the Larder service crate
// ABOUTME: Keeps crate::errors paths stable while the definitions live in larder-core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! `AppError`, `ErrorCode`, and `ProviderError` are defined in `larder-core`
//! so provider implementations and the service share one taxonomy.

pub use larder_core::errors::provider::{ProviderError, ProviderErrorKind, ProviderResult};
pub use larder_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
