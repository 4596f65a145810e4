// ABOUTME: Configuration management module for the Larder service
// ABOUTME: Re-exports environment-driven resolver, provider, HTTP client, and server settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and server configuration
pub mod environment;

pub use environment::{parse_providers, HttpClientConfig, ResolverConfig, ServerConfig};
