// ABOUTME: Usage metering records for the fallback estimation quota
// ABOUTME: UsageRecord lifecycle rules and the UsageSnapshot view returned to callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-subject count of fallback estimations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Guest session id or user id
    pub subject_key: String,
    /// Estimations consumed in the current window
    pub count: u32,
    /// When the current window started
    pub first_seen_at: DateTime<Utc>,
}

impl UsageRecord {
    /// Fresh record with a zero count
    #[must_use]
    pub fn new(subject_key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            subject_key: subject_key.into(),
            count: 0,
            first_seen_at: now,
        }
    }

    /// End of the record's window
    #[must_use]
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| self.first_seen_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// `now - first_seen_at > ttl`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now > self.expires_at(ttl)
    }

    /// A window that starts in the future can only come from a bad write or clock jump
    #[must_use]
    pub fn is_corrupt(&self, now: DateTime<Utc>) -> bool {
        self.first_seen_at > now
    }
}

/// Read-only view of a subject's quota state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Subject the snapshot describes
    pub subject_key: String,
    /// Estimations consumed in the current window
    pub count: u32,
    /// Configured quota
    pub quota: u32,
    /// Estimations still available
    pub remaining: u32,
    /// Window end, absent when the subject has no live record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resets_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_is_strictly_after_ttl() {
        let start = Utc::now();
        let record = UsageRecord::new("guest-1", start);
        let ttl = Duration::from_secs(60);

        assert!(!record.is_expired(start + chrono::Duration::seconds(60), ttl));
        assert!(record.is_expired(start + chrono::Duration::seconds(61), ttl));
    }

    #[test]
    fn test_future_window_is_corrupt() {
        let now = Utc::now();
        let record = UsageRecord::new("guest-1", now + chrono::Duration::hours(1));
        assert!(record.is_corrupt(now));
        assert!(!UsageRecord::new("guest-1", now).is_corrupt(now));
    }
}
