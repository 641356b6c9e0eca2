//! Simple Cache - A concurrency safe in-memory cache server
//!
//! Serves the cache transaction API over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use simplecache::models::Value;
use simplecache::{create_router, AppState, Cache, Config, HashCache, PartitionedCache};

/// Cache instance backing the server.
enum Backend {
    Single(Arc<HashCache<Value>>),
    Partitioned(Arc<PartitionedCache<Value>>),
}

impl Backend {
    fn from_config(config: &Config) -> Self {
        if config.partitions > 1 {
            Backend::Partitioned(Arc::new(PartitionedCache::new(
                config.partitions,
                config.sweep_interval,
            )))
        } else {
            Backend::Single(Arc::new(HashCache::new(config.sweep_interval)))
        }
    }

    fn cache(&self) -> Arc<dyn Cache<Value>> {
        match self {
            Backend::Single(cache) => cache.clone(),
            Backend::Partitioned(cache) => cache.clone(),
        }
    }

    async fn shutdown(&self) {
        match self {
            Backend::Single(cache) => cache.shutdown().await,
            Backend::Partitioned(cache) => cache.shutdown().await,
        }
    }
}

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (single or partitioned) with its expiry sweep
/// 4. Create Axum router
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, stop serving, then close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simplecache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Simple Cache Server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        sweep_interval = ?config.sweep_interval,
        partitions = config.partitions,
        default_expiry = ?config.default_expiry,
        max_body_bytes = config.max_body_bytes,
        "Configuration loaded"
    );

    let backend = Backend::from_config(&config);
    let state = AppState::from_config(backend.cache(), &config);
    info!("Cache initialized");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    backend.shutdown().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
