//! Mini Groupcache - A distributed read-through cache node
//!
//! Serves one group backed by a small in-memory score table, sharing keys
//! with the other configured nodes over HTTP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_groupcache::api::{create_api_router, create_router};
use mini_groupcache::{AppState, Config, GroupRegistry, LoaderFn, PeerDirectory};

/// Builds the slow origin the served group loads from.
fn score_source() -> LoaderFn<impl Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync> {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    LoaderFn::new(move |key: &str| {
        info!(key, "[SlowDB] search key");
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .with_context(|| format!("{} not exist", key))
    })
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the served group and its peer directory
/// 4. Start the frontend API server if `API_PORT` is set
/// 5. Start the peer-facing cache server
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_groupcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Groupcache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: node={}, peers={:?}, port={}, api_port={:?}, cache_bytes={}, replicas={}",
        config.node_addr,
        config.peers,
        config.server_port,
        config.api_port,
        config.cache_bytes,
        config.replicas
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry
        .new_group(&config.group_name, config.cache_bytes, score_source())
        .await?;

    let directory = Arc::new(PeerDirectory::http(
        &config.node_addr,
        config.replicas,
        &config.base_path,
        config.peer_timeout(),
    )?);
    directory.set_members(&config.peers).await;
    group.register_peers(directory)?;

    let state = AppState::new(registry, &config.group_name);

    let api_handle = match config.api_port {
        Some(port) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding frontend to {}", addr))?;
            info!("Frontend server listening on http://{}", addr);

            let app = create_api_router(state.clone());
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app).await {
                    warn!("Frontend server stopped: {}", e);
                }
            }))
        }
        None => None,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding cache server to {}", addr))?;
    info!("Cache server listening on http://{} as {}", addr, config.node_addr);

    axum::serve(listener, create_router(state, &config.base_path))
        .with_graceful_shutdown(shutdown_signal(api_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the frontend server and lets the cache
/// server drain.
async fn shutdown_signal(api_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    if let Some(handle) = api_handle {
        handle.abort();
        warn!("Frontend server aborted");
    }
}
