// ABOUTME: Fallback usage metering with injected clock and background sweep
// ABOUTME: Ledger trait, in-memory implementation, clocks, and sweeper task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Time sources
pub mod clock;
/// Ledger trait and in-memory implementation
pub mod ledger;
/// Periodic expiry task
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{validate_subject_key, InMemoryUsageLedger, UsageLedger};
pub use sweeper::UsageSweeper;
