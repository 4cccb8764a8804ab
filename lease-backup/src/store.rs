//! The live data store as seen by the backup engines.
//!
//! The engines only ever touch the store's file directly; the trait exists
//! for the two things that need the store's own semantics: counting lease
//! records at capture time and reopening connections after a swap.

use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

pub trait LiveStore: Send + Sync {
    /// Path of the single file holding the live data.
    fn data_path(&self) -> &Path;

    /// Number of lease records currently stored.
    fn count_records(&self) -> anyhow::Result<i64>;

    /// Called after the file has been replaced by a restore, while writes are
    /// still blocked. Implementations holding open handles must drop them here.
    fn reload(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// SQLite file counted through a short-lived read-only connection.
#[derive(Debug, Clone)]
pub struct SqliteFileStore {
    path: PathBuf,
    table: String,
}

impl SqliteFileStore {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }
}

/// `SELECT COUNT(*)` over `table`, quoted as an identifier.
pub fn count_rows(conn: &Connection, table: &str) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
    let count = conn
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("counting rows in {table}"))?;
    Ok(count)
}

impl LiveStore for SqliteFileStore {
    fn data_path(&self) -> &Path {
        &self.path
    }

    fn count_records(&self) -> anyhow::Result<i64> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("opening {}", self.path.display()))?;
        count_rows(&conn, &self.table)
    }
}
