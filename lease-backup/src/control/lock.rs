//! Non-blocking mutual exclusion over create, restore and delete.

use super::OperationKind;
use crate::utils::errors::{BackupError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// At most one backup-affecting operation holds this at a time.
///
/// Acquisition never waits: a second caller gets
/// `OperationInProgress` naming the operation already running.
#[derive(Clone, Default)]
pub struct OperationLock {
    held: Arc<Mutex<Option<OperationKind>>>,
}

impl OperationLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, kind: OperationKind) -> Result<OperationPermit> {
        let mut held = self.state();
        if let Some(running) = *held {
            tracing::warn!(requested = %kind, running = %running, "Backup operation rejected: lock held");
            return Err(BackupError::OperationInProgress { kind: running });
        }
        *held = Some(kind);
        tracing::debug!(kind = %kind, "Operation lock acquired");
        Ok(OperationPermit {
            lock: self.clone(),
            kind,
        })
    }

    /// The operation currently holding the lock, if any.
    pub fn current(&self) -> Option<OperationKind> {
        *self.state()
    }

    pub fn is_held(&self) -> bool {
        self.current().is_some()
    }

    // A panic while holding the permit poisons the mutex; the permit's Drop
    // still runs, so the inner value stays accurate and is safe to reuse.
    fn state(&self) -> MutexGuard<'_, Option<OperationKind>> {
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Scoped ownership of the [`OperationLock`]. Released on drop, which covers
/// early returns, `?` propagation and unwinding alike.
#[must_use = "the lock is released as soon as the permit is dropped"]
pub struct OperationPermit {
    lock: OperationLock,
    kind: OperationKind,
}

impl OperationPermit {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        *self.lock.state() = None;
        tracing::debug!(kind = %self.kind, "Operation lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_second_acquire_fails_with_running_kind() {
        let lock = OperationLock::new();
        let permit = lock.try_acquire(OperationKind::Restore).unwrap();

        for kind in [OperationKind::Create, OperationKind::Restore, OperationKind::Delete] {
            match lock.try_acquire(kind) {
                Err(BackupError::OperationInProgress { kind: running }) => {
                    assert_eq!(running, OperationKind::Restore)
                }
                Err(other) => panic!("unexpected error: {other}"),
                Ok(_) => panic!("lock granted twice"),
            }
        }

        assert_eq!(permit.kind(), OperationKind::Restore);
        drop(permit);
        assert!(!lock.is_held());
        assert!(lock.try_acquire(OperationKind::Create).is_ok());
    }

    #[test]
    fn test_release_on_early_return() {
        fn fails(lock: &OperationLock) -> Result<()> {
            let _permit = lock.try_acquire(OperationKind::Delete)?;
            Err(BackupError::NotFound { id: "gone".into() })
        }

        let lock = OperationLock::new();
        assert!(fails(&lock).is_err());
        assert_eq!(lock.current(), None);
    }

    #[test]
    fn test_release_on_panic() {
        let lock = OperationLock::new();
        let cloned = lock.clone();
        let result = thread::spawn(move || {
            let _permit = cloned.try_acquire(OperationKind::Create).unwrap();
            panic!("fault inside create");
        })
        .join();

        assert!(result.is_err());
        assert!(!lock.is_held());
        assert!(lock.try_acquire(OperationKind::Create).is_ok());
    }

    #[test]
    fn test_visible_across_threads() {
        let lock = OperationLock::new();
        let (held_tx, held_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let worker = {
            let lock = lock.clone();
            thread::spawn(move || {
                let _permit = lock.try_acquire(OperationKind::Create).unwrap();
                held_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            })
        };

        held_rx.recv().unwrap();
        assert_eq!(lock.current(), Some(OperationKind::Create));
        assert!(lock.try_acquire(OperationKind::Delete).is_err());

        release_tx.send(()).unwrap();
        worker.join().unwrap();
        assert!(lock.try_acquire(OperationKind::Delete).is_ok());
    }
}
