// ABOUTME: Structured error types for external nutrition provider calls
// ABOUTME: Maps detailed failures onto the Timeout/Unreachable/MalformedResponse taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};
use crate::models::ProviderId;
use serde::{Deserialize, Serialize};

/// Coarse classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// The provider did not answer within its timeout
    Timeout,
    /// The provider could not be reached or refused the request
    Unreachable,
    /// The provider answered with something we could not interpret
    MalformedResponse,
}

/// Errors raised by a `ProviderClient`
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Call exceeded its deadline
    #[error("{provider} timed out after {timeout_ms}ms")]
    Timeout {
        /// Provider that timed out
        provider: ProviderId,
        /// Deadline that was exceeded
        timeout_ms: u64,
    },

    /// Network-level failure
    #[error("{provider} unreachable: {reason}")]
    Unreachable {
        /// Provider that could not be reached
        provider: ProviderId,
        /// Transport error description
        reason: String,
    },

    /// Non-success HTTP status
    #[error("{provider} returned HTTP {status}")]
    HttpStatus {
        /// Provider that answered
        provider: ProviderId,
        /// HTTP status code
        status: u16,
    },

    /// Local or remote rate limit hit
    #[error("{provider} rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Provider that is rate limited
        provider: ProviderId,
        /// Seconds until a request may succeed
        retry_after_secs: u64,
    },

    /// Circuit breaker is open for this provider
    #[error("{provider} circuit open, retry after {retry_after_secs}s")]
    CircuitBreakerOpen {
        /// Provider whose circuit is open
        provider: ProviderId,
        /// Seconds until a recovery probe is allowed
        retry_after_secs: u64,
    },

    /// Response body could not be parsed or violated the contract
    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse {
        /// Provider that answered
        provider: ProviderId,
        /// Parse or validation failure
        reason: String,
    },
}

impl ProviderError {
    /// Provider that produced this error
    #[must_use]
    pub const fn provider(&self) -> ProviderId {
        match self {
            Self::Timeout { provider, .. }
            | Self::Unreachable { provider, .. }
            | Self::HttpStatus { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::CircuitBreakerOpen { provider, .. }
            | Self::MalformedResponse { provider, .. } => *provider,
        }
    }

    /// Coarse classification used for degraded-coverage reporting
    #[must_use]
    pub const fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::Timeout { .. } => ProviderErrorKind::Timeout,
            Self::Unreachable { .. }
            | Self::HttpStatus { .. }
            | Self::RateLimited { .. }
            | Self::CircuitBreakerOpen { .. } => ProviderErrorKind::Unreachable,
            Self::MalformedResponse { .. } => ProviderErrorKind::MalformedResponse,
        }
    }

    /// Whether the failure counts against the provider's circuit breaker
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Unreachable { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::RateLimited { .. }
            | Self::CircuitBreakerOpen { .. }
            | Self::MalformedResponse { .. } => false,
        }
    }

    /// Build a timeout error from a [`std::time::Duration`]
    #[must_use]
    pub fn timeout(provider: ProviderId, timeout: std::time::Duration) -> Self {
        // Provider timeouts are seconds at most, well within u64 millisecond range
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = timeout.as_millis() as u64;
        Self::Timeout {
            provider,
            timeout_ms,
        }
    }

    /// Build a malformed-response error
    #[must_use]
    pub fn malformed(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Build an unreachable error
    #[must_use]
    pub fn unreachable(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            provider,
            reason: reason.into(),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        let code = match error.kind() {
            ProviderErrorKind::Timeout => ErrorCode::ExternalTimeout,
            ProviderErrorKind::Unreachable => ErrorCode::ExternalServiceUnavailable,
            ProviderErrorKind::MalformedResponse => ErrorCode::ExternalServiceError,
        };
        Self::new(code, error.to_string())
            .with_details(serde_json::json!({ "provider": error.provider() }))
            .with_source(error)
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_kind_mapping() {
        let timeout = ProviderError::timeout(ProviderId::Usda, Duration::from_millis(250));
        assert_eq!(timeout.kind(), ProviderErrorKind::Timeout);
        assert!(timeout.to_string().contains("250ms"));

        let status = ProviderError::HttpStatus {
            provider: ProviderId::OpenFoodFacts,
            status: 503,
        };
        assert_eq!(status.kind(), ProviderErrorKind::Unreachable);
        assert!(status.is_retryable());

        let malformed = ProviderError::malformed(ProviderId::Usda, "missing foods");
        assert_eq!(malformed.kind(), ProviderErrorKind::MalformedResponse);
        assert!(!malformed.is_retryable());
    }

    #[test]
    fn test_client_errors_do_not_trip_breaker() {
        let not_found = ProviderError::HttpStatus {
            provider: ProviderId::Usda,
            status: 404,
        };
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_conversion_to_app_error() {
        let error: AppError =
            ProviderError::timeout(ProviderId::Usda, Duration::from_secs(3)).into();
        assert_eq!(error.code, ErrorCode::ExternalTimeout);
        assert_eq!(error.details["provider"], serde_json::json!("usda"));
    }
}
