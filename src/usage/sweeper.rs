// ABOUTME: Background task evicting expired usage records on a fixed interval
// ABOUTME: Runs independently of request traffic and stops on shutdown or drop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ledger::UsageLedger;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Handle to the periodic sweep task
///
/// Dropping the handle signals the task to stop.
pub struct UsageSweeper {
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl UsageSweeper {
    /// Spawn the sweep loop on the current Tokio runtime
    #[must_use]
    pub fn spawn(ledger: Arc<dyn UsageLedger>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = ledger.sweep_expired().await {
                            warn!(error = %e, "Usage sweep failed");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Usage sweeper received shutdown signal");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Usage sweeper task ended abnormally");
            }
        }
    }
}

impl Drop for UsageSweeper {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.shutdown_tx.try_send(()) {
                debug!(error = ?e, "Usage sweeper shutdown signal send failed (task likely finished)");
            }
        }
    }
}
