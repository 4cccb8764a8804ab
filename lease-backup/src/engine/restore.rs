//! Restore: verify an archive, then swap it in under the restore guard.
//!
//! Phases: `LockHeld -> GuardRaised -> Verifying -> Swapping -> Done`, or
//! `Aborted` from any phase after the guard is raised. The guard is only
//! lowered by leaving this function, never by a timeout.

use super::{snapshot, BackupService, CreateBackupRequest};
use crate::codec;
use crate::fs::write_atomic;
use crate::journal::BackupRecord;
use crate::utils::errors::{BackupError, Result};
use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    LockHeld,
    GuardRaised,
    Verifying,
    Swapping,
    Done,
    Aborted,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestorePhase::LockHeld => "lock_held",
            RestorePhase::GuardRaised => "guard_raised",
            RestorePhase::Verifying => "verifying",
            RestorePhase::Swapping => "swapping",
            RestorePhase::Done => "done",
            RestorePhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub restored: BackupRecord,
    /// Snapshot of the store as it was just before the swap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_restore: Option<BackupRecord>,
}

struct PhaseTracker<'a> {
    id: &'a str,
    phase: RestorePhase,
}

impl PhaseTracker<'_> {
    fn enter(&mut self, phase: RestorePhase) {
        debug!(backup_id = %self.id, from = %self.phase, to = %phase, "Restore phase");
        self.phase = phase;
    }
}

/// The caller holds the operation lock.
pub(super) fn run(service: &BackupService, id: &str, requested_by: Option<i64>) -> Result<RestoreOutcome> {
    let mut tracker = PhaseTracker {
        id,
        phase: RestorePhase::LockHeld,
    };
    info!(backup_id = %id, user_id = ?requested_by, "Restoring backup");

    let record = service
        .journal()
        .find_by_id(id)?
        .ok_or_else(|| BackupError::NotFound { id: id.to_string() })?;

    if !codec::is_valid_digest(&record.checksum) {
        return Err(BackupError::CorruptArchive(format!(
            "journal entry {id} carries a malformed checksum"
        )));
    }

    let archive_path = service.archive_path(&record);
    if !archive_path.exists() {
        return Err(BackupError::ArchiveMissing {
            id: id.to_string(),
            path: archive_path,
        });
    }

    let raised = service.control().guard.raise();
    tracker.enter(RestorePhase::GuardRaised);

    let result = verify_and_swap(service, &record, requested_by, &mut tracker);

    match &result {
        Ok(_) => tracker.enter(RestorePhase::Done),
        Err(e) => {
            let failed_in = tracker.phase;
            tracker.enter(RestorePhase::Aborted);
            error!(backup_id = %id, phase = %failed_in, code = %e.code(), error = %e, "Restore aborted");
        }
    }
    drop(raised);

    let pre_restore = result?;
    info!(backup_id = %id, pre_restore = ?pre_restore.as_ref().map(|r| &r.id), "Restore completed");
    Ok(RestoreOutcome {
        restored: record,
        pre_restore,
    })
}

fn verify_and_swap(
    service: &BackupService,
    record: &BackupRecord,
    requested_by: Option<i64>,
    tracker: &mut PhaseTracker<'_>,
) -> Result<Option<BackupRecord>> {
    tracker.enter(RestorePhase::Verifying);
    let archive_path = service.archive_path(record);
    let archive = std::fs::read(&archive_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BackupError::ArchiveMissing {
            id: record.id.clone(),
            path: archive_path.clone(),
        },
        _ => BackupError::io(format!("reading archive {}", archive_path.display()), e),
    })?;

    let data = codec::decompress(&archive)?;
    let actual = codec::checksum(&data);
    if actual != record.checksum {
        return Err(BackupError::ChecksumMismatch {
            id: record.id.clone(),
            expected: record.checksum.clone(),
            actual,
        });
    }

    let pre_restore = if service.config().pre_restore_backup {
        let request = CreateBackupRequest::new(format!("pre_restore:{}", record.id), requested_by);
        Some(snapshot::capture(service, &request)?)
    } else {
        None
    };

    tracker.enter(RestorePhase::Swapping);
    let live = service.store().data_path();
    write_atomic(live, &data, "restore")
        .map_err(|e| BackupError::io(format!("swapping live store {}", live.display()), e))?;

    service.store().reload().map_err(|e| {
        BackupError::Store(e.context("live store was replaced but could not be reopened"))
    })?;

    Ok(pre_restore)
}
