// ABOUTME: Per-provider circuit breaker guarding outbound nutrition API calls
// ABOUTME: Fails fast with CircuitBreakerOpen while a provider keeps timing out or erroring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use larder_core::errors::provider::{ProviderError, ProviderResult};
use larder_core::models::ProviderId;
use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through and failures are counted
    Closed,
    /// Calls fail immediately until the recovery timeout elapses
    Open,
    /// A single probe call is in flight
    HalfOpen,
}

impl CircuitState {
    const fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Closed,
            1 => Self::Open,
            _ => Self::HalfOpen,
        }
    }

    const fn as_u32(self) -> u32 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

/// Thresholds for opening and closing the circuit
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive retryable failures before the circuit opens
    pub failure_threshold: u32,
    /// How long the circuit stays open before a probe is allowed
    pub recovery_timeout: Duration,
    /// Consecutive probe successes needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration
    #[must_use]
    pub const fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
        }
    }
}

/// Lock-free circuit breaker for one provider
///
/// Only failures that [`ProviderError::is_retryable`] reports count toward
/// opening the circuit; a 404 or an unparseable body says nothing about the
/// provider's availability.
pub struct CircuitBreaker {
    provider: ProviderId,
    state: AtomicU32,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    /// Millis since `started` at which the circuit last opened
    opened_at_ms: AtomicU64,
    config: CircuitBreakerConfig,
    started: Instant,
}

impl CircuitBreaker {
    /// Breaker with the default configuration
    #[must_use]
    pub fn new(provider: ProviderId) -> Self {
        Self::with_config(provider, CircuitBreakerConfig::default())
    }

    /// Breaker with a custom configuration
    #[must_use]
    pub fn with_config(provider: ProviderId, config: CircuitBreakerConfig) -> Self {
        Self {
            provider,
            state: AtomicU32::new(CircuitState::Closed.as_u32()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            config,
            started: Instant::now(),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from_u32(self.state.load(Ordering::SeqCst))
    }

    /// Consecutive failures recorded while closed
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Whether a call may proceed right now
    ///
    /// Moving from open to half-open is a compare-exchange, so exactly one
    /// caller wins the probe.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => false,
            CircuitState::Open => {
                if self.millis_since_open() < self.recovery_ms() {
                    return false;
                }
                let won = self
                    .state
                    .compare_exchange(
                        CircuitState::Open.as_u32(),
                        CircuitState::HalfOpen.as_u32(),
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_ok();
                if won {
                    info!(provider = %self.provider, "Circuit half-open, probing provider");
                }
                won
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => self.failure_count.store(0, Ordering::SeqCst),
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.close();
                    info!(provider = %self.provider, "Circuit closed, provider recovered");
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a retryable failure
    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    self.open();
                    warn!(
                        provider = %self.provider,
                        failures,
                        recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
                        "Circuit opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                self.success_count.store(0, Ordering::SeqCst);
                self.open();
                warn!(provider = %self.provider, "Probe failed, circuit re-opened");
            }
            CircuitState::Open => self.opened_at_ms.store(self.elapsed_ms(), Ordering::SeqCst),
        }
    }

    /// Run `operation` under breaker protection
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::CircuitBreakerOpen` without running the
    /// operation while the circuit is open; otherwise the operation's own error.
    pub async fn call<F, T>(&self, operation: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        if !self.is_allowed() {
            return Err(ProviderError::CircuitBreakerOpen {
                provider: self.provider,
                retry_after_secs: self.secs_until_probe(),
            });
        }

        let mut in_flight = InFlight {
            breaker: self,
            settled: false,
        };
        let outcome = operation.await;
        in_flight.settled = true;

        match outcome {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                if error.is_retryable() {
                    self.record_failure();
                } else if self.state() == CircuitState::HalfOpen {
                    // The provider answered, so the probe proved it reachable
                    self.record_success();
                }
                Err(error)
            }
        }
    }

    /// Force the circuit closed
    pub fn reset(&self) {
        self.close();
        info!(provider = %self.provider, "Circuit manually reset");
    }

    fn open(&self) {
        self.opened_at_ms.store(self.elapsed_ms(), Ordering::SeqCst);
        self.state
            .store(CircuitState::Open.as_u32(), Ordering::SeqCst);
    }

    fn close(&self) {
        self.state
            .store(CircuitState::Closed.as_u32(), Ordering::SeqCst);
        self.failure_count.store(0, Ordering::SeqCst);
        self.success_count.store(0, Ordering::SeqCst);
    }

    fn secs_until_probe(&self) -> u64 {
        self.recovery_ms()
            .saturating_sub(self.millis_since_open())
            .div_ceil(1000)
    }

    fn millis_since_open(&self) -> u64 {
        self.elapsed_ms()
            .saturating_sub(self.opened_at_ms.load(Ordering::SeqCst))
    }

    // Recovery timeouts are seconds to minutes, well within u64 millis
    #[allow(clippy::cast_possible_truncation)]
    const fn recovery_ms(&self) -> u64 {
        self.config.recovery_timeout.as_millis() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Records a failure when a guarded call is dropped before it settles
///
/// Callers enforce deadlines by dropping the future, so an overrun only
/// reaches the breaker through this guard.
struct InFlight<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(provider = %self.breaker.provider, "Call cancelled before completion");
            self.breaker.record_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> ProviderError {
        ProviderError::unreachable(ProviderId::Usda, "connection refused")
    }

    #[tokio::test]
    async fn test_opens_after_threshold_and_fails_fast() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::Usda,
            CircuitBreakerConfig::new(2, Duration::from_secs(60), 1),
        );

        for _ in 0..2 {
            let result: ProviderResult<()> = breaker.call(async { Err(unreachable()) }).await;
            assert!(result.is_err());
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        let result: ProviderResult<()> = breaker.call(async { Ok(()) }).await;
        assert!(matches!(
            result,
            Err(ProviderError::CircuitBreakerOpen { retry_after_secs, .. }) if retry_after_secs > 0
        ));
    }

    #[tokio::test]
    async fn test_malformed_responses_do_not_count() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::OpenFoodFacts,
            CircuitBreakerConfig::new(1, Duration::from_secs(60), 1),
        );
        let result: ProviderResult<()> = breaker
            .call(async { Err(ProviderError::malformed(ProviderId::OpenFoodFacts, "bad json")) })
            .await;
        assert!(result.is_err());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_success_closes_circuit() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::Usda,
            CircuitBreakerConfig::new(1, Duration::ZERO, 1),
        );
        let _: ProviderResult<()> = breaker.call(async { Err(unreachable()) }).await;
        assert_eq!(breaker.state(), CircuitState::Open);

        let result = breaker.call(async { Ok(42) }).await;
        assert_eq!(result.ok(), Some(42));
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_deadline_overruns_open_circuit() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::Usda,
            CircuitBreakerConfig::new(2, Duration::from_secs(60), 1),
        );
        for _ in 0..2 {
            let hung = breaker.call(std::future::pending::<ProviderResult<()>>());
            assert!(tokio::time::timeout(Duration::from_millis(10), hung)
                .await
                .is_err());
        }
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_cancelled_probe_reopens_circuit() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::Usda,
            CircuitBreakerConfig::new(1, Duration::ZERO, 1),
        );
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);

        let probe = breaker.call(std::future::pending::<ProviderResult<()>>());
        assert!(tokio::time::timeout(Duration::from_millis(10), probe)
            .await
            .is_err());
        assert_eq!(breaker.state(), CircuitState::Open);

        let result = breaker.call(async { Ok(7) }).await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_rejected_call_records_nothing() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::Usda,
            CircuitBreakerConfig::new(1, Duration::from_secs(60), 1),
        );
        breaker.record_failure();
        let result: ProviderResult<()> = breaker.call(async { Ok(()) }).await;
        assert!(result.is_err());
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn test_reset_closes() {
        let breaker = CircuitBreaker::with_config(
            ProviderId::Usda,
            CircuitBreakerConfig::new(1, Duration::from_secs(60), 1),
        );
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        breaker.reset();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.is_allowed());
    }
}
