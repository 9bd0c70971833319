//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, database connection and migrations, the
//! deletion worker, and the Axum server lifecycle including graceful
//! shutdown.

use crate::api::middleware::trusted::TrustedNetworks;
use crate::config::{Backend, Config};
use crate::domain::deletion_worker::{deletion_queue, run_deletion_worker};
use crate::domain::repositories::{Storage, UrlRepository};
use crate::error::ShortenerError;
use crate::infrastructure::persistence::{FileStorage, MemoryStorage, PgStorage};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

/// How long shutdown waits for the deletion worker to drain.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection attempts after the first one before startup gives up.
const CONNECT_RETRIES: usize = 5;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL with migrations, file journal, or memory)
/// - Background deletion worker
/// - Axum HTTP server
///
/// On Ctrl+C or SIGTERM the server stops accepting requests, the deletion
/// worker drains its queue, and any buffered inserts are flushed.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails after retries
/// - Migrations or journal replay fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let storage = build_storage(&config).await?;

    let (deletions, deletion_rx) = deletion_queue(config.deletion_queue_capacity);
    let worker = tokio::spawn(run_deletion_worker(deletion_rx, storage.clone()));
    info!("Deletion worker started");

    let trusted = TrustedNetworks::new(config.trusted_ips()?);
    if trusted.is_empty() {
        info!("No trusted networks configured, internal stats are disabled");
    }

    let state = AppState::new(
        storage.clone(),
        deletions,
        &config.base_url,
        &config.secret,
        trusted,
    );
    let app = app_router(state);

    let addr: SocketAddr = config.server_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router, and with it the last deletion queue sender, is gone now.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => info!("Deletion worker drained"),
        Ok(Err(e)) => error!("Deletion worker failed: {}", e),
        Err(_) => warn!(
            "Deletion worker did not drain within {:?}",
            WORKER_DRAIN_TIMEOUT
        ),
    }

    match storage.flush().await {
        Ok(()) | Err(ShortenerError::NotImplemented(_)) => {}
        Err(e) => error!("Failed to flush pending inserts: {}", e),
    }

    info!("Server stopped");
    Ok(())
}

/// Creates the storage backend selected by `config`.
async fn build_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    match config.backend() {
        Backend::Postgres(dsn) => {
            let pool = connect(dsn, config).await?;
            info!("Connected to database");

            let storage = PgStorage::new(
                pool,
                config.insert_buffer_capacity,
                config.delete_buffer_capacity,
            );
            storage
                .migrate()
                .await
                .context("Failed to apply database migrations")?;

            Ok(Arc::new(storage))
        }
        Backend::File(path) => {
            let storage = FileStorage::open(path)
                .await
                .with_context(|| format!("Failed to open file storage at {}", path))?;
            Ok(Arc::new(storage))
        }
        Backend::Memory => {
            warn!("No DSN or file path configured, using in-memory storage");
            Ok(Arc::new(MemoryStorage::with_capacities(
                config.insert_buffer_capacity,
                config.delete_buffer_capacity,
            )))
        }
    }
}

/// Connects to PostgreSQL, retrying with exponential backoff.
async fn connect(dsn: &str, config: &Config) -> Result<PgPool> {
    let strategy = ExponentialBackoff::from_millis(10)
        .factor(20)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(CONNECT_RETRIES);

    Retry::spawn(strategy, || async {
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect(dsn)
            .await
            .inspect_err(|e| warn!("Database connection attempt failed: {}", e))
    })
    .await
    .context("Database unavailable")
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
