//! Lease store backup library
//!
//! Point-in-time, checksummed, zstd-compressed snapshots of the lease
//! database, a JSON catalog of them, and restores that block every other
//! writer while the live file is swapped.

pub mod codec;
pub mod config;
pub mod control;
pub mod engine;
pub mod fs;
pub mod journal;
pub mod outcome;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::BackupConfig;
pub use control::{BackupControl, OperationKind, OperationLock, RestoreGuard};
pub use engine::{BackupService, BackupStatus, CreateBackupRequest, RestoreOutcome};
pub use journal::{BackupList, BackupRecord};
pub use outcome::OperationOutcome;
pub use store::{LiveStore, SqliteFileStore};
pub use utils::errors::{BackupError, ErrorCode};
pub type Result<T> = std::result::Result<T, BackupError>;
