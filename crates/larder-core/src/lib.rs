// ABOUTME: Core types and constants for the Larder nutrition resolution engine
// ABOUTME: Foundation crate with error handling, food data model, units, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Larder Core
//!
//! Foundation crate providing shared types and constants for the Larder
//! nutrition resolution engine. Provider implementations and the resolution
//! engine both build on these types, so this crate is designed to change
//! infrequently.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ProviderError`
//! - **models**: Food queries, canonical nutrition records, provider identity, usage records
//! - **units**: Portion unit conversion to grams
//! - **constants**: Confidence curves, defaults, and service names

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (queries, nutrition facts, resolved foods, usage records)
pub mod models;

/// Portion unit conversion
pub mod units;
