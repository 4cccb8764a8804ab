//! One-time journal migrations.

use super::record::UNKNOWN_STORE_COUNT;
use crate::fs::write_atomic;
use crate::utils::errors::{BackupError, Result};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Set `storeCount` to `-1` on every record that lacks it.
///
/// Works on the raw JSON so that fields this version does not know about
/// survive the rewrite. Returns the number of records changed; a second run
/// returns 0 and leaves the file untouched.
pub fn backfill_store_count(path: &Path) -> Result<usize> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(BackupError::io(format!("reading journal {}", path.display()), e)),
    };

    let mut doc: Value =
        serde_json::from_slice(&content).map_err(|source| BackupError::JournalCorrupt {
            path: path.to_path_buf(),
            source,
        })?;

    let mut changed = 0;
    if let Some(backups) = doc.get_mut("backups").and_then(Value::as_array_mut) {
        for entry in backups.iter_mut().filter_map(Value::as_object_mut) {
            let missing = entry.get("storeCount").map_or(true, Value::is_null);
            if missing {
                entry.insert("storeCount".into(), Value::from(UNKNOWN_STORE_COUNT));
                changed += 1;
            }
        }
    }

    if changed == 0 {
        return Ok(0);
    }

    let body = serde_json::to_vec_pretty(&doc)
        .map_err(|e| BackupError::io("serializing journal", std::io::Error::other(e)))?;
    write_atomic(path, &body, "tmp")
        .map_err(|e| BackupError::io(format!("writing journal {}", path.display()), e))?;

    tracing::info!(path = %path.display(), changed, "Backfilled missing store counts");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::Journal;
    use tempfile::TempDir;

    const LEGACY: &str = r#"{
        "version": 1,
        "backups": [
            {
                "id": "backup-20240101-000000",
                "filename": "backup-20240101-000000.db.zst",
                "createdAt": "2024-01-01T00:00:00Z",
                "size": 4096,
                "compressedSize": 1024,
                "checksum": "aa",
                "uploadedBy": "legacy-tool"
            },
            {
                "id": "backup-20240102-000000",
                "filename": "backup-20240102-000000.db.zst",
                "createdAt": "2024-01-02T00:00:00Z",
                "size": 4096,
                "compressedSize": 1024,
                "checksum": "bb",
                "storeCount": 12
            }
        ]
    }"#;

    #[test]
    fn test_backfill_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backups.json");
        std::fs::write(&path, LEGACY).unwrap();

        assert_eq!(backfill_store_count(&path).unwrap(), 1);
        assert_eq!(backfill_store_count(&path).unwrap(), 0);

        let catalog = Journal::new(&path).read().unwrap();
        assert_eq!(catalog.backups[0].store_count, UNKNOWN_STORE_COUNT);
        assert_eq!(catalog.backups[1].store_count, 12);

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["backups"][0]["uploadedBy"], "legacy-tool");
    }

    #[test]
    fn test_backfill_without_journal() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            backfill_store_count(&temp_dir.path().join("backups.json")).unwrap(),
            0
        );
    }
}
