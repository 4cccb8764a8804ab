//! Process-wide coordination state: the operation lock and the restore guard.
//!
//! Both live behind `Arc`s inside [`BackupControl`], which is created once
//! per process and cloned into every context that needs it (request
//! handlers, schedulers, the CLI). Nothing here is a static.

pub mod guard;
pub mod lock;

pub use guard::{RaisedGuard, RestoreGuard};
pub use lock::{OperationLock, OperationPermit};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backup-affecting operations. Any two are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Restore,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Restore => "restore",
            OperationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared handle bundling the lock and the guard.
#[derive(Clone, Default)]
pub struct BackupControl {
    pub lock: OperationLock,
    pub guard: RestoreGuard,
}

impl BackupControl {
    pub fn new() -> Self {
        Self::default()
    }
}
