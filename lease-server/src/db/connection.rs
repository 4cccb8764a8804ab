use anyhow::Context;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Opens a pool over the live database file.
///
/// Rollback journal mode keeps the whole database in the single file the
/// backup engines snapshot and swap.
pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = DELETE;
             PRAGMA synchronous = FULL;
             PRAGMA foreign_keys = ON;",
        )
    });
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .with_context(|| format!("Failed to open DB pool at {}", db_path.display()))?;
    Ok(pool)
}
