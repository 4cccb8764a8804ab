//! Metadata journal: the durable catalog of backups.
//!
//! The catalog is one JSON document, loaded whole for every operation and
//! written back whole through an atomic replace. The file on disk is
//! therefore always a complete catalog: either the one before a write or
//! the one after it.

pub mod migrate;
pub mod record;

pub use migrate::backfill_store_count;
pub use record::{BackupCatalog, BackupList, BackupRecord, JOURNAL_VERSION, UNKNOWN_STORE_COUNT};

use crate::fs::write_atomic;
use crate::utils::errors::{BackupError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the catalog. A missing file is an empty catalog.
    pub fn read(&self) -> Result<BackupCatalog> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BackupCatalog::default()),
            Err(e) => {
                return Err(BackupError::io(
                    format!("reading journal {}", self.path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&content).map_err(|source| BackupError::JournalCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the journal with `catalog`.
    pub fn write(&self, catalog: &BackupCatalog) -> Result<()> {
        let body = serde_json::to_vec_pretty(catalog).map_err(|e| {
            BackupError::io("serializing journal", std::io::Error::other(e))
        })?;
        write_atomic(&self.path, &body, "tmp").map_err(|e| {
            BackupError::io(format!("writing journal {}", self.path.display()), e)
        })?;
        tracing::debug!(path = %self.path.display(), records = catalog.len(), "Journal written");
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<BackupRecord>> {
        Ok(self.read()?.find_by_id(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample(id: &str) -> BackupRecord {
        BackupRecord {
            id: id.to_string(),
            filename: format!("{id}.db.zst"),
            created_at: Utc::now(),
            size: 10,
            compressed_size: 8,
            checksum: crate::codec::checksum(id.as_bytes()),
            store_count: 0,
            reason: "manual".to_string(),
            created_by: Some(7),
        }
    }

    #[test]
    fn test_missing_journal_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("backups.json"));
        let catalog = journal.read().unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.version, JOURNAL_VERSION);
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("backups.json"));

        let mut catalog = BackupCatalog::default();
        catalog.push(sample("one"));
        catalog.push(sample("two"));
        journal.write(&catalog).unwrap();

        assert_eq!(journal.read().unwrap(), catalog);
        assert_eq!(
            journal.find_by_id("two").unwrap().map(|r| r.created_by),
            Some(Some(7))
        );
        assert!(journal.find_by_id("three").unwrap().is_none());
    }

    #[test]
    fn test_unparseable_journal_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backups.json");
        std::fs::write(&path, b"{ \"backups\": [ truncated").unwrap();

        let err = Journal::new(&path).read().unwrap_err();
        assert!(matches!(err, BackupError::JournalCorrupt { .. }));
        assert_eq!(err.code(), crate::ErrorCode::IoError);
    }
}
