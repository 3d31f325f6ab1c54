//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, ReconnectingRedisCache, RedisCache};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Key prefix separating this service's entries in a shared Redis.
const REDIS_KEY_PREFIX: &str = "linkforge:";

/// How often the in-process cache drops expired slots.
const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache: Redis, in-process [`MemoryCache`] when Redis is not configured, or
///   [`ReconnectingRedisCache`] when it is configured but unreachable
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let cache = connect_cache(&config).await;

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(
        Arc::new(pool.clone()),
        config.db_query_timeout(),
    ));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        repository.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!("Click worker started");

    let state = AppState::new(repository, cache, click_tx, config.service_settings());

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last senders; the worker drains what is queued and exits.
    tracing::info!("Draining click queue");
    if let Err(e) = worker.await {
        tracing::error!("Click worker panicked: {}", e);
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Redis not configured, using in-process cache");
        let cache = Arc::new(MemoryCache::new());
        tokio::spawn(purge_memory_cache(cache.clone()));
        return cache;
    };

    match RedisCache::connect(redis_url, REDIS_KEY_PREFIX, config.cache_timeout()).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to connect to Redis: {}. Serving without cache and retrying in background.",
                e
            );
            let cache = Arc::new(ReconnectingRedisCache::new(
                redis_url.as_str(),
                REDIS_KEY_PREFIX,
                config.cache_timeout(),
            ));
            let reconnect = cache.clone();
            tokio::spawn(async move { reconnect.connect_in_background().await });
            cache
        }
    }
}

async fn purge_memory_cache(cache: Arc<MemoryCache>) {
    let mut ticker = tokio::time::interval(MEMORY_PURGE_INTERVAL);
    loop {
        ticker.tick().await;
        let purged = cache.purge_expired();
        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
