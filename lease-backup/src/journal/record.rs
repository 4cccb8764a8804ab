//! Catalog record types, serialized as the on-disk journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current journal schema version
pub const JOURNAL_VERSION: u32 = 1;

/// Marker for records captured before the store count was tracked.
pub const UNKNOWN_STORE_COUNT: i64 = -1;

/// One cataloged snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    /// Uncompressed length of the live store at capture time.
    pub size: u64,
    pub compressed_size: u64,
    /// SHA-256 hex of the uncompressed bytes.
    pub checksum: String,
    #[serde(default = "unknown_store_count")]
    pub store_count: i64,
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(default)]
    pub created_by: Option<i64>,
}

fn unknown_store_count() -> i64 {
    UNKNOWN_STORE_COUNT
}

fn default_reason() -> String {
    "manual".to_string()
}

/// Insertion-ordered set of records; always persisted whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupCatalog {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub backups: Vec<BackupRecord>,
}

fn current_version() -> u32 {
    JOURNAL_VERSION
}

impl Default for BackupCatalog {
    fn default() -> Self {
        Self {
            version: JOURNAL_VERSION,
            backups: Vec::new(),
        }
    }
}

impl BackupCatalog {
    pub fn find_by_id(&self, id: &str) -> Option<&BackupRecord> {
        self.backups.iter().find(|b| b.id == id)
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.backups.iter().any(|b| b.filename == filename)
    }

    pub fn push(&mut self, record: BackupRecord) {
        self.backups.push(record);
    }

    /// Remove and return the record with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<BackupRecord> {
        let idx = self.backups.iter().position(|b| b.id == id)?;
        Some(self.backups.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.backups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }

    /// Newest-first listing plus totals.
    pub fn to_list(&self) -> BackupList {
        let mut backups = self.backups.clone();
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total_size = backups.iter().map(|b| b.compressed_size).sum();
        let last_backup = backups.iter().map(|b| b.created_at).max();
        BackupList {
            backups,
            total_size,
            last_backup,
        }
    }
}

/// Derived view returned by `list_backups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupList {
    pub backups: Vec<BackupRecord>,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_backup: Option<DateTime<Utc>>,
}
