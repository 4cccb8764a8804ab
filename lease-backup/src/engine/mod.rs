//! Backup service: create, list, restore and delete snapshots of the live store.
//!
//! One [`BackupService`] exists per process. Create, restore and delete run
//! under the shared [`OperationLock`](crate::control::OperationLock); list
//! reads whatever catalog is currently durable and never takes the lock.
//! All methods block on filesystem I/O and should be called off async
//! executors (`spawn_blocking`).

mod restore;
mod snapshot;

pub use restore::{RestoreOutcome, RestorePhase};

use crate::config::BackupConfig;
use crate::control::{BackupControl, OperationKind};
use crate::journal::{BackupList, BackupRecord, Journal};
use crate::store::LiveStore;
use crate::utils::errors::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(default)]
    pub created_by: Option<i64>,
}

fn default_reason() -> String {
    "manual".to_string()
}

impl Default for CreateBackupRequest {
    fn default() -> Self {
        Self {
            reason: default_reason(),
            created_by: None,
        }
    }
}

impl CreateBackupRequest {
    pub fn new(reason: impl Into<String>, created_by: Option<i64>) -> Self {
        Self {
            reason: reason.into(),
            created_by,
        }
    }
}

/// Lock-free snapshot of what the service is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    pub running: Option<OperationKind>,
    pub restore_in_progress: bool,
}

pub struct BackupService {
    config: BackupConfig,
    journal: Journal,
    store: Arc<dyn LiveStore>,
    control: BackupControl,
}

impl BackupService {
    pub fn new(
        config: BackupConfig,
        store: Arc<dyn LiveStore>,
        control: BackupControl,
    ) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.backup_dir).map_err(|e| {
            BackupError::io(
                format!("creating backup directory {}", config.backup_dir.display()),
                e,
            )
        })?;

        Ok(Self {
            journal: Journal::new(config.journal_path()),
            config,
            store,
            control,
        })
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    pub fn control(&self) -> &BackupControl {
        &self.control
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn archive_path(&self, record: &BackupRecord) -> PathBuf {
        self.config.backup_dir.join(&record.filename)
    }

    /// Snapshot the live store and append it to the catalog.
    pub fn create_backup(&self, request: CreateBackupRequest) -> Result<BackupRecord> {
        let _permit = self.control.lock.try_acquire(OperationKind::Create)?;
        snapshot::capture(self, &request)
    }

    /// Newest-first catalog with totals. Lock-free.
    pub fn list_backups(&self) -> Result<BackupList> {
        Ok(self.journal.read()?.to_list())
    }

    /// Replace the live store with the snapshot `id`.
    pub fn restore_backup(&self, id: &str, requested_by: Option<i64>) -> Result<RestoreOutcome> {
        let _permit = self.control.lock.try_acquire(OperationKind::Restore)?;
        restore::run(self, id, requested_by)
    }

    /// Remove the archive and catalog entry for `id`.
    pub fn delete_backup(&self, id: &str, requested_by: Option<i64>) -> Result<BackupRecord> {
        let _permit = self.control.lock.try_acquire(OperationKind::Delete)?;

        let mut catalog = self.journal.read()?;
        let record = catalog
            .remove(id)
            .ok_or_else(|| BackupError::NotFound { id: id.to_string() })?;

        let archive = self.archive_path(&record);
        match std::fs::remove_file(&archive) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(backup_id = %id, path = %archive.display(), "Archive already missing, dropping catalog entry");
            }
            Err(e) => {
                return Err(BackupError::io(
                    format!("removing archive {}", archive.display()),
                    e,
                ))
            }
        }

        self.journal.write(&catalog)?;
        tracing::info!(backup_id = %id, user_id = ?requested_by, "Backup deleted");
        Ok(record)
    }

    /// Gate for writers of the live store.
    pub fn ensure_writable(&self) -> Result<()> {
        self.control.guard.check()
    }

    pub fn status(&self) -> BackupStatus {
        BackupStatus {
            running: self.control.lock.current(),
            restore_in_progress: self.control.guard.is_raised(),
        }
    }

    fn store(&self) -> &dyn LiveStore {
        self.store.as_ref()
    }
}
