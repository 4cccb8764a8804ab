//! Snapshot capture: read, checksum, compress, archive, catalog.

use super::{BackupService, CreateBackupRequest};
use crate::codec;
use crate::fs::{staging_path, write_synced};
use crate::journal::{BackupCatalog, BackupRecord, UNKNOWN_STORE_COUNT};
use crate::utils::errors::{BackupError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

const ARCHIVE_EXTENSION: &str = "db.zst";

/// Capture the live store. The caller holds the operation lock.
///
/// Nothing is left behind on failure: the archive is written under a staging
/// name, renamed into place only once complete, and removed again if the
/// catalog cannot be persisted.
pub(super) fn capture(service: &BackupService, request: &CreateBackupRequest) -> Result<BackupRecord> {
    let data_path = service.store().data_path();
    info!(reason = %request.reason, source = %data_path.display(), "Creating backup");

    let data = std::fs::read(data_path)
        .map_err(|e| BackupError::io(format!("reading live store {}", data_path.display()), e))?;
    let size = data.len() as u64;
    let checksum = codec::checksum(&data);

    let store_count = match service.store().count_records() {
        Ok(count) => count,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Could not count lease records, storing unknown");
            UNKNOWN_STORE_COUNT
        }
    };

    let archive = codec::compress(&data, service.config().compression_level)?;
    drop(data);
    let compressed_size = archive.len() as u64;

    let mut catalog = service.journal().read()?;
    let created_at = Utc::now();
    let (id, filename) = unique_name(&catalog, &created_at, service.config().backup_dir.as_path());
    let archive_path = service.config().backup_dir.join(&filename);

    let partial = staging_path(&archive_path, "partial");
    if let Err(e) = write_synced(&partial, &archive).and_then(|_| std::fs::rename(&partial, &archive_path)) {
        let _ = std::fs::remove_file(&partial);
        return Err(BackupError::io(
            format!("writing archive {}", archive_path.display()),
            e,
        ));
    }

    let record = BackupRecord {
        id,
        filename,
        created_at,
        size,
        compressed_size,
        checksum,
        store_count,
        reason: request.reason.clone(),
        created_by: request.created_by,
    };

    catalog.push(record.clone());
    if let Err(e) = service.journal().write(&catalog) {
        if let Err(cleanup) = std::fs::remove_file(&archive_path) {
            warn!(path = %archive_path.display(), error = %cleanup, "Failed to remove orphaned archive");
        }
        return Err(e);
    }

    info!(
        backup_id = %record.id,
        bytes = record.size,
        compressed = record.compressed_size,
        store_count = record.store_count,
        "Backup created"
    );
    Ok(record)
}

/// `backup-YYYYmmdd-HHMMSS-xxxxxxxx`, retried until it clashes with neither
/// the catalog nor a stray file in the backup directory.
fn unique_name(catalog: &BackupCatalog, at: &DateTime<Utc>, dir: &Path) -> (String, String) {
    let stamp = at.format("%Y%m%d-%H%M%S");
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("backup-{stamp}-{}", &suffix[..8]);
        let filename = format!("{id}.{ARCHIVE_EXTENSION}");
        if catalog.find_by_id(&id).is_none()
            && !catalog.contains_filename(&filename)
            && !dir.join(&filename).exists()
        {
            return (id, filename);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unique_name_shape() {
        let temp_dir = TempDir::new().unwrap();
        let at = Utc::now();
        let (id, filename) = unique_name(&BackupCatalog::default(), &at, temp_dir.path());

        assert!(id.starts_with(&format!("backup-{}", at.format("%Y%m%d-%H%M%S"))));
        assert_eq!(filename, format!("{id}.db.zst"));
    }

    #[test]
    fn test_unique_name_avoids_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let at = Utc::now();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let (_, filename) = unique_name(&BackupCatalog::default(), &at, temp_dir.path());
            std::fs::write(temp_dir.path().join(&filename), b"").unwrap();
            assert!(seen.insert(filename));
        }
    }
}
