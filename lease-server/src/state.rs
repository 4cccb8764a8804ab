use crate::config::AppConfig;
use crate::db::connection::DbPool;
use crate::services::live_store::PooledStore;
use lease_backup::{BackupControl, BackupService};
use std::sync::Arc;

pub struct AppState {
    pub store: Arc<PooledStore>,
    pub backups: Arc<BackupService>,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<PooledStore>) -> anyhow::Result<Self> {
        let backups = BackupService::new(config.backup_config(), store.clone(), BackupControl::new())?;
        Ok(Self {
            store,
            backups: Arc::new(backups),
        })
    }

    pub fn db(&self) -> DbPool {
        self.store.pool()
    }
}
