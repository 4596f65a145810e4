// ABOUTME: Sliding-window request limiter for metered provider APIs
// ABOUTME: Fails fast with a retry hint instead of sleeping inside a deadline-bound search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window limiter: at most `limit` requests per `window`
#[derive(Debug)]
pub struct RateLimiter {
    requests: VecDeque<Instant>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter
    #[must_use]
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self {
            requests: VecDeque::new(),
            limit,
            window,
        }
    }

    /// Limiter allowing `limit` requests per minute
    #[must_use]
    pub const fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Record a request if the window has room
    ///
    /// # Errors
    ///
    /// Returns how long until the oldest request leaves the window when the
    /// limit is reached.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&mut self, now: Instant) -> Result<(), Duration> {
        while self
            .requests
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            self.requests.pop_front();
        }

        if self.requests.len() < self.limit as usize {
            self.requests.push_back(now);
            return Ok(());
        }

        let oldest = self.requests.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }
}
