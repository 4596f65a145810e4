// ABOUTME: Larder HTTP server binary wiring configuration, providers, ledger, and routes
// ABOUTME: Serves the resolution API with a background usage sweeper and graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Larder Server Binary
//!
//! Loads configuration from the environment, builds the provider registry and
//! usage ledger, and serves the nutrition API until Ctrl-C.

use anyhow::Result;
use clap::Parser;
use larder::{
    config::ServerConfig,
    logging,
    providers::{initialize_shared_client, shared_client, ProviderRegistry},
    resolution::ResolutionOrchestrator,
    routes::{self, ResolverResources},
    usage::{InMemoryUsageLedger, UsageLedger, UsageSweeper},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "larder-server")]
#[command(about = "Larder - nutrition resolution API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;
    info!("Starting Larder nutrition resolution server");

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    info!("{}", config.summary());

    initialize_shared_client(
        config.http_client.timeout_secs,
        config.http_client.connect_timeout_secs,
    );
    let registry = ProviderRegistry::from_settings(&config.providers, shared_client());
    info!(providers = ?registry.ids(), "Provider registry ready");

    let ledger: Arc<dyn UsageLedger> = Arc::new(InMemoryUsageLedger::new(&config.resolver));
    let sweeper = UsageSweeper::spawn(Arc::clone(&ledger), config.resolver.sweep_interval);

    let orchestrator = ResolutionOrchestrator::new(registry, ledger, config.resolver.clone());
    let app = routes::router(Arc::new(ResolverResources::new(orchestrator)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.shutdown().await;
    if let Err(e) = served {
        error!("Server error: {e}");
        return Err(e.into());
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
