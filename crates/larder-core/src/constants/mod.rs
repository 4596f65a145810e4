// ABOUTME: Application constants for confidence curves, resolver defaults, and limits
// ABOUTME: Named values replace magic numbers scattered through the resolution engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Application constants organized by domain

/// Confidence curve parameters per provider family
pub mod confidence {
    /// Confidence for an exact barcode hit, regardless of provider
    pub const EXACT_MATCH: f64 = 1.0;

    /// Top-ranked result confidence for authoritative databases
    pub const AUTHORITATIVE_CEILING: f64 = 0.95;
    /// Multiplicative decay per rank position for authoritative databases
    pub const AUTHORITATIVE_RANK_DECAY: f64 = 0.85;
    /// Confidence when an authoritative result carries no signal
    pub const AUTHORITATIVE_MISSING_SIGNAL: f64 = 0.5;

    /// Top-ranked result confidence for community/brand databases
    pub const COMMUNITY_CEILING: f64 = 0.85;
    /// Multiplicative decay per rank position for community/brand databases
    pub const COMMUNITY_RANK_DECAY: f64 = 0.80;
    /// Confidence when a community result carries no signal
    pub const COMMUNITY_MISSING_SIGNAL: f64 = 0.4;

    /// Confidence when an AI-derived result carries no self-reported value
    pub const AI_DERIVED_MISSING_SIGNAL: f64 = 0.3;

    /// Fixed confidence of a heuristic estimate
    pub const ESTIMATE: f64 = 0.3;
}

/// Resolver defaults (overridable through environment configuration)
pub mod defaults {
    /// Minimum top-result confidence for a provider answer to be accepted
    pub const ACCEPT_THRESHOLD: f64 = 0.6;
    /// Per-provider search deadline in milliseconds
    pub const PROVIDER_TIMEOUT_MS: u64 = 3_000;
    /// Free fallback estimations per subject per TTL window
    pub const FREE_FALLBACK_QUOTA: u32 = 1;
    /// Usage record lifetime in seconds (24 hours)
    pub const USAGE_TTL_SECS: u64 = 86_400;
    /// Interval between ledger sweeps in seconds (1 hour)
    pub const SWEEP_INTERVAL_SECS: u64 = 3_600;
    /// Portion used when a text or barcode query carries none
    pub const PORTION_QUANTITY: f64 = 100.0;
    /// Unit of the default portion
    pub const PORTION_UNIT: &str = "g";
    /// Default HTTP port for the server binary
    pub const HTTP_PORT: u16 = 8081;
}

/// Input validation limits
pub mod limits {
    /// Maximum subject key length
    pub const MAX_SUBJECT_KEY_LEN: usize = 128;
    /// Maximum free-text query length
    pub const MAX_QUERY_TEXT_LEN: usize = 200;
    /// Accepted barcode lengths (EAN-8, UPC-A, EAN-13, GTIN-14)
    pub const BARCODE_LENGTHS: [usize; 4] = [8, 12, 13, 14];
}

/// Service names for structured logging
pub mod service_names {
    /// Server binary service name
    pub const LARDER_SERVER: &str = "larder-server";
}
