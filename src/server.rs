//! HTTP server initialization and runtime setup.
//!
//! Opens the store bindings, selects the edge cache and origin client, and
//! runs the Axum server until a shutdown signal arrives.

use crate::api::middleware::rate_limit::SystemClock;
use crate::config::Config;
use crate::infrastructure::cache::{EdgeCache, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::kv::{self, KvStore};
use crate::infrastructure::origin::{HttpOrigin, NoOrigin, OriginClient};
use crate::routes::app_router;
use crate::state::{AppState, Backends};
use crate::utils::code_generator::RandomCodes;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Timeout for requests to the origin upstream.
const ORIGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Link and telemetry stores (unset bindings stay unconfigured)
/// - Edge cache (Redis, in-memory or disabled)
/// - Origin upstream client
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - A configured store cannot be reached
/// - The origin client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let links_store = open_binding(config.links_store_url.as_deref(), "links").await?;
    let telemetry_store = open_binding(config.telemetry_store_url.as_deref(), "telemetry").await?;

    let cache = select_cache(&config.edge_cache).await;

    let origin: Arc<dyn OriginClient> = match &config.origin_upstream_url {
        Some(url) => {
            tracing::info!("Origin upstream: {url}");
            Arc::new(HttpOrigin::new(url, ORIGIN_TIMEOUT).context("Failed to build origin client")?)
        }
        None => {
            tracing::warn!("No origin upstream configured; unmatched routes will answer 404");
            Arc::new(NoOrigin)
        }
    };

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .context("LISTEN must be a socket address")?;

    let state = AppState::new(
        config,
        Backends {
            links_store,
            telemetry_store,
            cache,
            origin,
            codes: Arc::new(RandomCodes),
            clock: Arc::new(SystemClock),
        },
    )?;

    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Opens a store binding, or reports it as unconfigured.
///
/// # Errors
///
/// Returns an error if the binding is set but cannot be opened.
pub async fn open_binding(url: Option<&str>, namespace: &str) -> Result<Option<Arc<dyn KvStore>>> {
    let Some(url) = url else {
        tracing::warn!(namespace, "Store binding not configured; its endpoints will answer 500");
        return Ok(None);
    };

    let store = kv::connect(url, namespace)
        .await
        .with_context(|| format!("Failed to open {namespace} store"))?;
    tracing::info!(namespace, "Store connected");
    Ok(Some(store))
}

async fn select_cache(setting: &str) -> Arc<dyn EdgeCache> {
    match setting {
        "off" => {
            tracing::info!("Edge cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
        "memory" => {
            tracing::info!("Edge cache enabled (in-memory)");
            Arc::new(MemoryCache::new())
        }
        redis_url => match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Edge cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect edge cache: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
