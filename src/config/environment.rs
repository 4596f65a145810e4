// ABOUTME: Environment-based configuration for the resolver, providers, HTTP client, and server
// ABOUTME: Parses LARDER_*, USDA_*, OPENFOODFACTS_* and HTTP_* variables with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-only configuration
//!
//! Every option has a default; a variable that is set but unparseable is a
//! configuration error rather than a silent fallback to the default.

use crate::constants::{confidence, defaults};
use crate::errors::{AppError, AppResult};
use crate::models::ProviderId;
use larder_providers::{OpenFoodFactsConfig, ProviderSettings, UsdaConfig};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Resolution engine tuning
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Minimum confidence for the top merged result to be accepted
    pub accept_threshold: f64,
    /// Deadline for providers that do not declare their own
    pub per_provider_timeout: Duration,
    /// Fallback estimations allowed per subject per TTL window
    pub free_fallback_quota: u32,
    /// Lifetime of a usage record before it resets
    pub usage_ttl: Duration,
    /// How often expired usage records are swept
    pub sweep_interval: Duration,
    /// Return low-confidence provider hits alongside an estimate
    pub include_low_confidence_hits: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            accept_threshold: defaults::ACCEPT_THRESHOLD,
            per_provider_timeout: Duration::from_millis(defaults::PROVIDER_TIMEOUT_MS),
            free_fallback_quota: defaults::FREE_FALLBACK_QUOTA,
            usage_ttl: Duration::from_secs(defaults::USAGE_TTL_SECS),
            sweep_interval: Duration::from_secs(defaults::SWEEP_INTERVAL_SECS),
            include_low_confidence_hits: true,
        }
    }
}

impl ResolverConfig {
    /// Load from `LARDER_*` variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` if a variable is malformed or the result fails validation.
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            accept_threshold: parse_env("LARDER_ACCEPT_THRESHOLD", defaults::ACCEPT_THRESHOLD)?,
            per_provider_timeout: Duration::from_millis(parse_env(
                "LARDER_PROVIDER_TIMEOUT_MS",
                defaults::PROVIDER_TIMEOUT_MS,
            )?),
            free_fallback_quota: parse_env(
                "LARDER_FREE_FALLBACK_QUOTA",
                defaults::FREE_FALLBACK_QUOTA,
            )?,
            usage_ttl: Duration::from_secs(parse_env(
                "LARDER_USAGE_TTL_SECS",
                defaults::USAGE_TTL_SECS,
            )?),
            sweep_interval: Duration::from_secs(parse_env(
                "LARDER_SWEEP_INTERVAL_SECS",
                defaults::SWEEP_INTERVAL_SECS,
            )?),
            include_low_confidence_hits: parse_bool("LARDER_INCLUDE_LOW_CONFIDENCE", true)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants between options
    ///
    /// The threshold must sit strictly above the estimator's fixed confidence,
    /// otherwise an estimate could pass as an accepted lookup.
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` describing the first violated rule.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.accept_threshold > 0.0 && self.accept_threshold <= 1.0) {
            return Err(AppError::config(format!(
                "LARDER_ACCEPT_THRESHOLD must be in (0, 1], got {}",
                self.accept_threshold
            )));
        }
        if self.accept_threshold <= confidence::ESTIMATE {
            return Err(AppError::config(format!(
                "LARDER_ACCEPT_THRESHOLD must be above the estimate confidence {}",
                confidence::ESTIMATE
            )));
        }
        if self.per_provider_timeout.is_zero() {
            return Err(AppError::config("LARDER_PROVIDER_TIMEOUT_MS must be non-zero"));
        }
        if self.usage_ttl.is_zero() {
            return Err(AppError::config("LARDER_USAGE_TTL_SECS must be non-zero"));
        }
        if self.sweep_interval.is_zero() {
            return Err(AppError::config("LARDER_SWEEP_INTERVAL_SECS must be non-zero"));
        }
        Ok(())
    }
}

/// Shared outbound HTTP client timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl HttpClientConfig {
    /// Load from `HTTP_CLIENT_*` variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` if a variable is not a number or is zero.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let config = Self {
            timeout_secs: parse_env("HTTP_CLIENT_TIMEOUT_SECS", defaults.timeout_secs)?,
            connect_timeout_secs: parse_env(
                "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Both timeouts must be non-zero
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` naming the zero timeout.
    pub fn validate(&self) -> AppResult<()> {
        if self.timeout_secs == 0 {
            return Err(AppError::config("HTTP_CLIENT_TIMEOUT_SECS must be non-zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(AppError::config(
                "HTTP_CLIENT_CONNECT_TIMEOUT_SECS must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Resolution engine tuning
    pub resolver: ResolverConfig,
    /// Enabled providers and their settings
    pub providers: ProviderSettings,
    /// Shared HTTP client timeouts
    pub http_client: HttpClientConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` on malformed or inconsistent values.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Ok(Self {
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            resolver: ResolverConfig::from_env()?,
            providers: provider_settings_from_env()?,
            http_client: HttpClientConfig::from_env()?,
        })
    }

    /// One-line summary for startup logs; never includes secrets
    #[must_use]
    pub fn summary(&self) -> String {
        let providers: Vec<&str> = self
            .providers
            .enabled
            .iter()
            .map(|id| id.as_str())
            .collect();
        format!(
            "port={} providers=[{}] accept_threshold={} provider_timeout_ms={} quota={} usage_ttl_secs={} usda_key={}",
            self.http_port,
            providers.join(","),
            self.resolver.accept_threshold,
            self.resolver.per_provider_timeout.as_millis(),
            self.resolver.free_fallback_quota,
            self.resolver.usage_ttl.as_secs(),
            if self.providers.usda.api_key.is_some() { "set" } else { "unset" },
        )
    }
}

fn provider_settings_from_env() -> AppResult<ProviderSettings> {
    let usda_defaults = UsdaConfig::default();
    let off_defaults = OpenFoodFactsConfig::default();

    let enabled = match env::var("LARDER_PROVIDERS") {
        Ok(list) => parse_providers(&list)?,
        Err(_) => ProviderSettings::default().enabled,
    };

    Ok(ProviderSettings {
        enabled,
        usda: UsdaConfig {
            api_key: env::var("USDA_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: env_var_or("USDA_BASE_URL", &usda_defaults.base_url),
            page_size: parse_env("USDA_PAGE_SIZE", usda_defaults.page_size)?,
            cache_ttl_secs: parse_env("USDA_CACHE_TTL_SECS", usda_defaults.cache_ttl_secs)?,
            rate_limit_per_minute: parse_env(
                "USDA_RATE_LIMIT_PER_MINUTE",
                usda_defaults.rate_limit_per_minute,
            )?,
            ..usda_defaults
        },
        open_food_facts: OpenFoodFactsConfig {
            base_url: env_var_or("OPENFOODFACTS_BASE_URL", &off_defaults.base_url),
            page_size: parse_env("OPENFOODFACTS_PAGE_SIZE", off_defaults.page_size)?,
            user_agent: env_var_or("OPENFOODFACTS_USER_AGENT", &off_defaults.user_agent),
        },
    })
}

/// Parse an ordered, comma separated provider list
///
/// # Errors
///
/// Returns `CONFIG_INVALID` for an unknown provider name.
pub fn parse_providers(list: &str) -> AppResult<Vec<ProviderId>> {
    let mut providers = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id: ProviderId = name.parse()?;
        if !providers.contains(&id) {
            providers.push(id);
        }
    }
    Ok(providers)
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("{key}={raw:?} is invalid: {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &str, default: bool) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::config(format!("{key}={raw:?} is not a boolean"))),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_must_exceed_estimate_confidence() {
        let config = ResolverConfig {
            accept_threshold: confidence::ESTIMATE,
            ..ResolverConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().code, ErrorCode::ConfigInvalid);

        let config = ResolverConfig {
            accept_threshold: 1.5,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_durations_rejected() {
        let config = ResolverConfig {
            sweep_interval: Duration::ZERO,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_http_client_timeouts_rejected() {
        assert!(HttpClientConfig::default().validate().is_ok());

        let config = HttpClientConfig {
            connect_timeout_secs: 0,
            ..HttpClientConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().code, ErrorCode::ConfigInvalid);
    }

    #[test]
    fn test_parse_providers_keeps_order_and_dedups() {
        let providers = parse_providers("off, usda ,off,image").unwrap();
        assert_eq!(
            providers,
            vec![
                ProviderId::OpenFoodFacts,
                ProviderId::Usda,
                ProviderId::ImageGuess
            ]
        );
        assert!(parse_providers("usda,nutritionix").is_err());
        assert!(parse_providers("").unwrap().is_empty());
    }
}
