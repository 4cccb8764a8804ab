use crate::db::connection::{create_pool, DbPool};
use lease_backup::store::count_rows;
use lease_backup::LiveStore;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

/// The server's live database: an r2d2 pool that is rebuilt whenever a
/// restore swaps the file underneath it.
pub struct PooledStore {
    path: PathBuf,
    table: String,
    pool: RwLock<DbPool>,
}

impl PooledStore {
    pub fn open(path: impl Into<PathBuf>, table: impl Into<String>) -> anyhow::Result<Self> {
        let path = path.into();
        let pool = create_pool(&path)?;
        Ok(Self {
            path,
            table: table.into(),
            pool: RwLock::new(pool),
        })
    }

    /// Current pool, held for the lifetime of the returned guard. `reload`
    /// waits until every outstanding guard is dropped, so a writer that
    /// checks the restore guard while holding this never writes to a
    /// replaced file.
    pub fn lock_pool(&self) -> RwLockReadGuard<'_, DbPool> {
        self.pool
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Handle to the current pool. Connections checked out from a pool that
    /// was replaced keep pointing at the old file until they are returned.
    pub fn pool(&self) -> DbPool {
        self.pool
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LiveStore for PooledStore {
    fn data_path(&self) -> &Path {
        &self.path
    }

    fn count_records(&self) -> anyhow::Result<i64> {
        let conn = self.pool().get()?;
        count_rows(&conn, &self.table)
    }

    fn reload(&self) -> anyhow::Result<()> {
        let fresh = create_pool(&self.path)?;
        let mut pool = self
            .pool
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *pool = fresh;
        tracing::info!(path = %self.path.display(), "Reopened database pool");
        Ok(())
    }
}
