//! Configuration for the backup service.
//!
//! Loads from a TOML file; the CLI layers its flags on top.

use crate::codec::DEFAULT_LEVEL;
use crate::utils::errors::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Live SQLite file that gets snapshotted and restored
    pub data_file: PathBuf,

    /// Directory holding the archives and the journal
    pub backup_dir: PathBuf,

    /// Journal file name inside `backup_dir`
    #[serde(default = "default_journal_file")]
    pub journal_file: String,

    /// zstd level (1-22)
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,

    /// Snapshot the live store before every restore
    #[serde(default = "default_pre_restore_backup")]
    pub pre_restore_backup: bool,

    /// Table whose rows are counted into `storeCount`
    #[serde(default = "default_record_table")]
    pub record_table: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_journal_file() -> String {
    "backups.json".to_string()
}

fn default_compression_level() -> i32 {
    DEFAULT_LEVEL
}

fn default_pre_restore_backup() -> bool {
    true
}

fn default_record_table() -> String {
    "stores".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BackupConfig {
    pub fn new(data_file: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            backup_dir: backup_dir.into(),
            journal_file: default_journal_file(),
            compression_level: default_compression_level(),
            pre_restore_backup: default_pre_restore_backup(),
            record_table: default_record_table(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BackupConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.backup_dir.join(&self.journal_file)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=22).contains(&self.compression_level) {
            return Err(BackupError::Config(format!(
                "compression_level must be between 1 and 22, got {}",
                self.compression_level
            )));
        }
        if self.record_table.trim().is_empty() {
            return Err(BackupError::Config("record_table must not be empty".into()));
        }
        if self.journal_file.trim().is_empty() {
            return Err(BackupError::Config("journal_file must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BackupConfig::new("/data/arriendos.db", "/data/backups");
        assert_eq!(config.journal_path(), PathBuf::from("/data/backups/backups.json"));
        assert_eq!(config.compression_level, 3);
        assert!(config.pre_restore_backup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_fills_defaults() {
        let config: BackupConfig = toml::from_str(
            r#"
            data_file = "/srv/arriendos.db"
            backup_dir = "/srv/backups"
            pre_restore_backup = false
            "#,
        )
        .unwrap();
        assert_eq!(config.record_table, "stores");
        assert_eq!(config.journal_file, "backups.json");
        assert!(!config.pre_restore_backup);
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = BackupConfig::new("a.db", "b");
        config.compression_level = 40;
        assert!(matches!(config.validate(), Err(BackupError::Config(_))));
    }
}
