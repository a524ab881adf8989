//! HTTP entry point for the recommendation chat.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use server::{ServerConfig, http};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,server=debug")),
        )
        .init();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(err) => warn!("No .env file loaded ({}); relying on process environment", err),
    }

    let config = ServerConfig::parse();
    info!("Starting MoodyMovie server");

    let orchestrator = config
        .services
        .build_orchestrator()
        .context("Failed to initialize orchestrator")?;

    let sessions = Arc::clone(orchestrator.sessions());
    match sessions.spawn_reaper(config.reap_interval()) {
        Some(_) => info!(
            "Reaping sessions idle for {:?} every {:?}",
            sessions.idle_timeout().unwrap_or_default(),
            config.reap_interval()
        ),
        None => info!("Session expiry disabled"),
    }

    let app = http::router(orchestrator);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
