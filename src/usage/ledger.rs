// ABOUTME: Per-subject ledger metering fallback estimations with quota and TTL reset
// ABOUTME: UsageLedger trait plus a sharded in-memory implementation with atomic check-and-increment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Usage ledger
//!
//! The ledger is the only state shared across concurrent resolutions. Each
//! subject has at most one [`UsageRecord`]; a record older than the TTL is
//! replaced by a fresh one on next use (a reset, not a decay).
//!
//! `InMemoryUsageLedger` keeps records in a `DashMap`. `try_consume` performs
//! the whole read-check-write through the map's entry API, which holds the
//! shard's write lock for the duration, so two requests racing at the quota
//! boundary cannot both succeed. The sweep takes the same shard locks through
//! `retain`, so it never interleaves with a consume on the same key.

use super::clock::{Clock, SystemClock};
use crate::config::ResolverConfig;
use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::models::{UsageRecord, UsageSnapshot};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Metering of expensive fallback invocations per subject
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Consume one unit of `subject_key`'s quota if any remains
    ///
    /// Returns `true` when the unit was consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject key is invalid or the backing store fails.
    async fn try_consume(&self, subject_key: &str) -> AppResult<bool>;

    /// Current quota state of `subject_key` without consuming
    ///
    /// # Errors
    ///
    /// Returns an error if the subject key is invalid or the backing store fails.
    async fn usage(&self, subject_key: &str) -> AppResult<UsageSnapshot>;

    /// Drop `subject_key`'s record, returning whether one existed
    ///
    /// # Errors
    ///
    /// Returns an error if the subject key is invalid or the backing store fails.
    async fn reset(&self, subject_key: &str) -> AppResult<bool>;

    /// Evict every record past its TTL, returning how many were evicted
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    async fn sweep_expired(&self) -> AppResult<usize>;
}

/// Validate a guest-session or user id used as a ledger key
///
/// # Errors
///
/// Returns `MISSING_REQUIRED_FIELD` for a blank key and `VALUE_OUT_OF_RANGE`
/// for one longer than the key limit.
pub fn validate_subject_key(subject_key: &str) -> AppResult<()> {
    if subject_key.trim().is_empty() {
        return Err(AppError::missing_field("subject_key"));
    }
    if subject_key.chars().count() > limits::MAX_SUBJECT_KEY_LEN {
        return Err(AppError::out_of_range(format!(
            "'subject_key' must be at most {} characters",
            limits::MAX_SUBJECT_KEY_LEN
        )));
    }
    Ok(())
}

/// Process-local ledger
pub struct InMemoryUsageLedger {
    records: DashMap<String, UsageRecord>,
    quota: u32,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryUsageLedger {
    /// Ledger using the configured quota and TTL and the system clock
    #[must_use]
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_clock(
            config.free_fallback_quota,
            config.usage_ttl,
            Arc::new(SystemClock),
        )
    }

    /// Ledger with an explicit clock
    #[must_use]
    pub fn with_clock(quota: u32, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            quota,
            ttl,
            clock,
        }
    }

    /// Number of live records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Configured quota
    #[must_use]
    pub const fn quota(&self) -> u32 {
        self.quota
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn try_consume(&self, subject_key: &str) -> AppResult<bool> {
        validate_subject_key(subject_key)?;
        let now = self.clock.now();

        let mut entry = self
            .records
            .entry(subject_key.to_owned())
            .or_insert_with(|| UsageRecord::new(subject_key, now));
        let record = entry.value_mut();

        if record.is_corrupt(now) {
            warn!(
                subject = %subject_key,
                first_seen_at = %record.first_seen_at,
                "Usage record starts in the future, resetting"
            );
            *record = UsageRecord::new(subject_key, now);
        } else if record.is_expired(now, self.ttl) {
            *record = UsageRecord::new(subject_key, now);
        }

        if record.count < self.quota {
            record.count += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn usage(&self, subject_key: &str) -> AppResult<UsageSnapshot> {
        validate_subject_key(subject_key)?;
        let now = self.clock.now();

        let live = self.records.get(subject_key).and_then(|record| {
            (!record.is_expired(now, self.ttl) && !record.is_corrupt(now))
                .then(|| (record.count, record.expires_at(self.ttl)))
        });

        let (count, resets_at) = live.map_or((0, None), |(count, at)| (count, Some(at)));
        Ok(UsageSnapshot {
            subject_key: subject_key.to_owned(),
            count,
            quota: self.quota,
            remaining: self.quota.saturating_sub(count),
            resets_at,
        })
    }

    async fn reset(&self, subject_key: &str) -> AppResult<bool> {
        validate_subject_key(subject_key)?;
        Ok(self.records.remove(subject_key).is_some())
    }

    async fn sweep_expired(&self) -> AppResult<usize> {
        let now = self.clock.now();
        let mut evicted = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_expired(now, self.ttl) && !record.is_corrupt(now);
            if !keep {
                evicted += 1;
            }
            keep
        });
        debug!(evicted, remaining = self.records.len(), "Usage sweep complete");
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_key_validation() {
        assert!(validate_subject_key("guest-1").is_ok());
        assert!(validate_subject_key("  ").is_err());
        assert!(validate_subject_key(&"k".repeat(129)).is_err());
        assert!(validate_subject_key(&"k".repeat(128)).is_ok());
    }
}
