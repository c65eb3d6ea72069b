//! HTTP server initialization and runtime setup.
//!
//! Handles the record store, cache setup and Axum server lifecycle.

use crate::application::services::{ResolutionService, ResolutionSettings};
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{InMemoryUrlRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::alias_generator::RandomAliasGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record store (PostgreSQL pool with migrations, or in-memory)
/// - Cache (Redis, Moka or NullCache fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (repository, pool) = open_store(&config).await?;
    let cache = open_cache(&config).await;

    let service = Arc::new(ResolutionService::new(
        repository,
        cache,
        Arc::new(RandomAliasGenerator),
        ResolutionSettings::from_config(&config),
    ));

    let app = app_router(AppState::new(service));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Server stopped");

    Ok(())
}

/// Opens the configured record store. The pool is returned so it can be
/// closed on shutdown.
async fn open_store(config: &Config) -> Result<(Arc<dyn UrlRepository>, Option<PgPool>)> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory record store; data is lost on restart");
            Ok((Arc::new(InMemoryUrlRepository::new()), None))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            let repository = PgUrlRepository::new(Arc::new(pool.clone()));
            Ok((Arc::new(repository), Some(pool)))
        }
    }
}

/// Opens the configured cache, falling back to [`NullCache`] when Redis is
/// unreachable at startup.
async fn open_cache(config: &Config) -> Arc<dyn CacheService> {
    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                    Arc::new(NullCache::new())
                }
            }
        }
        (CacheBackend::Memory, _) => {
            tracing::info!(
                capacity = config.memory_cache_capacity,
                "Cache enabled (memory)"
            );
            Arc::new(MemoryCache::new(
                config.memory_cache_capacity,
                config.cache_ttl_seconds,
            ))
        }
        _ => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

/// Resolves when the process receives Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections");
}
