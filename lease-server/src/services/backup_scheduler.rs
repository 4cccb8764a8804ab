use crate::state::AppState;
use lease_backup::{BackupRecord, CreateBackupRequest};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

pub const CRON_REASON: &str = "cron";

pub struct BackupScheduler {
    scheduler: Mutex<JobScheduler>,
    state: Arc<AppState>,
}

impl BackupScheduler {
    pub async fn new(state: Arc<AppState>) -> anyhow::Result<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            state,
        })
    }

    /// Registers the periodic snapshot. Uses the six-field cron syntax of
    /// `tokio-cron-scheduler` (seconds first).
    pub async fn schedule(&self, cron_expression: &str) -> anyhow::Result<()> {
        let state = self.state.clone();

        let job = Job::new_async(cron_expression, move |_uuid, _lock| {
            let state = state.clone();
            Box::pin(async move {
                run_scheduled_backup(state).await;
            })
        })?;

        self.scheduler.lock().await.add(job).await?;
        tracing::info!(cron = %cron_expression, "Backup schedule registered");
        Ok(())
    }

    pub async fn start(&self) -> anyhow::Result<()> {
        self.scheduler.lock().await.start().await?;
        Ok(())
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.scheduler.lock().await.shutdown().await?;
        Ok(())
    }
}

/// One scheduled tick. A tick that finds another operation running is
/// skipped; the next tick tries again.
pub async fn run_scheduled_backup(state: Arc<AppState>) -> Option<BackupRecord> {
    let service = state.backups.clone();
    let result = tokio::task::spawn_blocking(move || {
        service.create_backup(CreateBackupRequest::new(CRON_REASON, None))
    })
    .await;

    match result {
        Ok(Ok(record)) => {
            tracing::info!(backup_id = %record.id, store_count = record.store_count, "Scheduled backup created");
            Some(record)
        }
        Ok(Err(e)) if e.is_transient() => {
            tracing::warn!(error = %e, "Skipping scheduled backup: another operation is running");
            None
        }
        Ok(Err(e)) => {
            tracing::error!(code = %e.code(), error = %e, "Scheduled backup failed");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Scheduled backup task panicked");
            None
        }
    }
}
