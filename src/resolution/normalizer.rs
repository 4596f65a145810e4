// ABOUTME: Maps each provider family's native match signal onto one comparable [0,1] confidence
// ABOUTME: Exact matches score 1.0, ranked hits decay geometrically, self-reports are clamped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Confidence normalization
//!
//! | Family        | Exact | Rank `n`        | Self-reported `c` | Missing |
//! |---------------|-------|-----------------|-------------------|---------|
//! | Authoritative | 1.0   | `0.95 * 0.85^n` | `clamp(c)`        | 0.5     |
//! | Community     | 1.0   | `0.85 * 0.80^n` | `clamp(c)`        | 0.4     |
//! | AI-derived    | 1.0   | `0.85 * 0.80^n` | `clamp(c)`        | 0.3     |
//! | Estimate      | 0.3   | 0.3             | 0.3               | 0.3     |
//!
//! Every output is clamped to [0, 1]; a non-finite self-reported value is
//! treated as missing.

use crate::constants::confidence;
use crate::models::{MatchSignal, ProviderFamily, ProviderId, RawResult, ResolvedFood};

struct Curve {
    ceiling: f64,
    rank_decay: f64,
    missing: f64,
}

const AUTHORITATIVE: Curve = Curve {
    ceiling: confidence::AUTHORITATIVE_CEILING,
    rank_decay: confidence::AUTHORITATIVE_RANK_DECAY,
    missing: confidence::AUTHORITATIVE_MISSING_SIGNAL,
};

const COMMUNITY: Curve = Curve {
    ceiling: confidence::COMMUNITY_CEILING,
    rank_decay: confidence::COMMUNITY_RANK_DECAY,
    missing: confidence::COMMUNITY_MISSING_SIGNAL,
};

const AI_DERIVED: Curve = Curve {
    ceiling: confidence::COMMUNITY_CEILING,
    rank_decay: confidence::COMMUNITY_RANK_DECAY,
    missing: confidence::AI_DERIVED_MISSING_SIGNAL,
};

const fn curve(family: ProviderFamily) -> Option<&'static Curve> {
    match family {
        ProviderFamily::Authoritative => Some(&AUTHORITATIVE),
        ProviderFamily::Community => Some(&COMMUNITY),
        ProviderFamily::AiDerived => Some(&AI_DERIVED),
        ProviderFamily::Estimate => None,
    }
}

/// Normalized confidence of `signal` reported by `provider`
///
/// Monotonic non-increasing in rank position and non-decreasing in a
/// self-reported value; always within [0, 1].
#[must_use]
pub fn normalize(signal: &MatchSignal, provider: ProviderId) -> f64 {
    let Some(curve) = curve(provider.family()) else {
        return confidence::ESTIMATE;
    };

    let score = match *signal {
        MatchSignal::ExactMatch => confidence::EXACT_MATCH,
        MatchSignal::Rank { position } => {
            let exponent = i32::try_from(position).unwrap_or(i32::MAX);
            curve.ceiling * curve.rank_decay.powi(exponent)
        }
        MatchSignal::SelfReported { confidence } if confidence.is_finite() => confidence,
        MatchSignal::SelfReported { .. } | MatchSignal::Missing => curve.missing,
    };
    score.clamp(0.0, 1.0)
}

/// Score a raw provider result and convert it to the canonical record
#[must_use]
pub fn resolve(raw: RawResult, provider: ProviderId) -> ResolvedFood {
    let confidence = normalize(&raw.signal, provider);
    ResolvedFood {
        name: raw.name,
        brand: raw.brand,
        quantity: raw.quantity,
        unit: raw.unit,
        nutrition: raw.nutrition,
        confidence,
        source: provider,
    }
}
