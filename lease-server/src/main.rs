mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;
mod state;

use crate::config::AppConfig;
use crate::db::migrate::migrate;
use crate::services::backup_scheduler::BackupScheduler;
use crate::services::live_store::PooledStore;
use crate::state::AppState;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .init();

    tracing::info!("Starting lease server on port {}", config.port);

    // Ensure data directories exist
    std::fs::create_dir_all(&config.data_dir)?;
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    let store = Arc::new(PooledStore::open(&config.db_path, "stores")?);
    migrate(&store.pool())?;

    // Legacy catalog entries (one-time, idempotent)
    let backup_config = config.backup_config();
    match lease_backup::journal::backfill_store_count(&backup_config.journal_path()) {
        Ok(0) => {}
        Ok(n) => tracing::info!(records = n, "Backfilled storeCount on legacy backups"),
        Err(e) => tracing::warn!("Backup journal migration failed: {}", e),
    }

    // Build application state
    let state = Arc::new(AppState::new(&config, store)?);

    // Periodic snapshots
    let scheduler = match &config.backup_cron {
        Some(cron) => match start_scheduler(state.clone(), cron).await {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!("Failed to start backup scheduler: {}", e);
                None
            }
        },
        None => None,
    };

    // Build router
    let app = routes::create_router(state.clone());

    // Start HTTP server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");

    if let Some(s) = scheduler {
        if let Err(e) = s.shutdown().await {
            tracing::warn!("Scheduler shutdown error: {}", e);
        }
    }

    // A restore may still be finishing in the blocking pool
    if state.backups.status().running.is_some() {
        tracing::warn!("Backup operation still running at shutdown");
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn start_scheduler(state: Arc<AppState>, cron: &str) -> anyhow::Result<BackupScheduler> {
    let scheduler = BackupScheduler::new(state).await?;
    scheduler.schedule(cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
