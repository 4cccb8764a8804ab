//! Error taxonomy for backup operations.

use crate::control::OperationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("A backup operation is already in progress: {kind}")]
    OperationInProgress { kind: OperationKind },

    #[error("A restore is in progress, writes are temporarily rejected")]
    RestoreInProgress,

    #[error("Backup not found: {id}")]
    NotFound { id: String },

    #[error("Archive for backup {id} is missing at {}", path.display())]
    ArchiveMissing { id: String, path: PathBuf },

    #[error("Checksum mismatch for backup {id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Backup journal at {} is not parseable: {source}", path.display())]
    JournalCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Live store error: {0:#}")]
    Store(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackupError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BackupError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wire code reported to callers.
    pub fn code(&self) -> ErrorCode {
        match self {
            BackupError::OperationInProgress { .. } => ErrorCode::BackupOperationInProgress,
            BackupError::RestoreInProgress => ErrorCode::RestoreInProgress,
            BackupError::NotFound { .. } | BackupError::ArchiveMissing { .. } => {
                ErrorCode::NotFound
            }
            BackupError::ChecksumMismatch { .. } | BackupError::CorruptArchive(_) => {
                ErrorCode::ChecksumMismatch
            }
            BackupError::JournalCorrupt { .. }
            | BackupError::Io { .. }
            | BackupError::Store(_)
            | BackupError::Config(_) => ErrorCode::IoError,
        }
    }

    /// Contention that clears on its own; callers should retry later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::BackupOperationInProgress | ErrorCode::RestoreInProgress
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BackupOperationInProgress,
    RestoreInProgress,
    NotFound,
    ChecksumMismatch,
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BackupOperationInProgress => "BACKUP_OPERATION_IN_PROGRESS",
            ErrorCode::RestoreInProgress => "RESTORE_IN_PROGRESS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ChecksumMismatch => "CHECKSUM_MISMATCH",
            ErrorCode::IoError => "IO_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_cover_taxonomy() {
        let busy = BackupError::OperationInProgress {
            kind: OperationKind::Restore,
        };
        assert_eq!(busy.code(), ErrorCode::BackupOperationInProgress);
        assert!(busy.is_transient());
        assert!(busy.to_string().contains("restore"));

        assert_eq!(BackupError::RestoreInProgress.code(), ErrorCode::RestoreInProgress);

        let missing = BackupError::ArchiveMissing {
            id: "b1".into(),
            path: PathBuf::from("/tmp/b1.db.zst"),
        };
        assert_eq!(missing.code(), ErrorCode::NotFound);
        assert!(!missing.is_transient());

        assert_eq!(
            BackupError::CorruptArchive("bad frame".into()).code(),
            ErrorCode::ChecksumMismatch
        );

        let io = BackupError::io("reading", std::io::Error::other("disk"));
        assert_eq!(io.code(), ErrorCode::IoError);
    }

    #[test]
    fn test_code_serializes_as_wire_string() {
        let json = serde_json::to_string(&ErrorCode::BackupOperationInProgress).unwrap();
        assert_eq!(json, "\"BACKUP_OPERATION_IN_PROGRESS\"");
        assert_eq!(ErrorCode::IoError.to_string(), "IO_ERROR");
    }
}
