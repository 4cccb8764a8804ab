//! Crash-safe file replacement.
//!
//! Content is written to a sibling staging file, flushed to disk, then
//! renamed over the target. Rename within one directory is atomic on the
//! filesystems we deploy to, so readers see either the old or the new file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling path used while `target` is being replaced.
pub fn staging_path(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{suffix}"))
}

/// Write `data` to `path` so that a crash never leaves it half-written.
pub fn write_atomic(path: &Path, data: &[u8], suffix: &str) -> io::Result<()> {
    let staging = staging_path(path, suffix);
    if let Err(e) = write_synced(&staging, data).and_then(|_| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    sync_parent(path);
    Ok(())
}

/// Create `path` with `data` and fsync it before returning.
pub fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

// Persist the directory entry after a rename. Best-effort.
fn sync_parent(path: &Path) {
    #[cfg(unix)]
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_content() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("backups.json");
        fs::write(&target, b"old")?;

        write_atomic(&target, b"new content", "tmp")?;

        assert_eq!(fs::read(&target)?, b"new content");
        assert!(!staging_path(&target, "tmp").exists());
        Ok(())
    }

    #[test]
    fn test_write_atomic_creates_missing_file() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("fresh.db");

        write_atomic(&target, b"", "tmp")?;

        assert!(target.exists());
        assert_eq!(fs::metadata(&target)?.len(), 0);
        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_target_intact() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let target = temp_dir.path().join("missing-dir").join("live.db");

        assert!(write_atomic(&target, b"data", "tmp").is_err());
        assert!(!target.exists());
        Ok(())
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let staged = staging_path(Path::new("/var/lib/app/arriendos.db"), "restore");
        assert_eq!(staged, PathBuf::from("/var/lib/app/.arriendos.db.restore"));
    }
}
