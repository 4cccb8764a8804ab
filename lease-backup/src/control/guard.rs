//! Restore guard consulted by every writer of the live store.

use crate::utils::errors::{BackupError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Raised exactly while a restore is swapping the live store.
///
/// Writers outside the backup core call [`RestoreGuard::check`] before every
/// mutation. The flag is in-memory only and starts lowered on every process
/// start.
#[derive(Clone, Default)]
pub struct RestoreGuard {
    raised: Arc<AtomicBool>,
}

impl RestoreGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// `Err(RestoreInProgress)` while a restore is running.
    pub fn check(&self) -> Result<()> {
        if self.is_raised() {
            Err(BackupError::RestoreInProgress)
        } else {
            Ok(())
        }
    }

    /// Raise the guard until the returned value is dropped.
    pub fn raise(&self) -> RaisedGuard {
        if self.raised.swap(true, Ordering::AcqRel) {
            tracing::warn!("Restore guard raised while already raised");
        }
        tracing::info!("Restore guard raised, live store writes rejected");
        RaisedGuard {
            guard: self.clone(),
        }
    }
}

/// Lowers the guard on drop, on every exit path of a restore.
#[must_use = "the guard is lowered as soon as this is dropped"]
pub struct RaisedGuard {
    guard: RestoreGuard,
}

impl Drop for RaisedGuard {
    fn drop(&mut self) {
        self.guard.raised.store(false, Ordering::Release);
        tracing::info!("Restore guard lowered");
    }
}
