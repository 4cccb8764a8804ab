//! zstd archive encoding.
//!
//! Frames are written with the zstd content checksum enabled, so a damaged
//! archive is usually rejected by the decoder itself before the SHA-256
//! comparison runs.

use crate::utils::errors::{BackupError, Result};
use std::io::Write;

pub const DEFAULT_LEVEL: i32 = 3;

/// Compress `data` into a single zstd frame.
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    let mut encoder = zstd::stream::Encoder::new(Vec::with_capacity(data.len() / 2), level)
        .map_err(|e| BackupError::io("initializing zstd encoder", e))?;
    encoder
        .include_checksum(true)
        .map_err(|e| BackupError::io("configuring zstd encoder", e))?;
    encoder
        .write_all(data)
        .map_err(|e| BackupError::io("compressing snapshot", e))?;
    encoder
        .finish()
        .map_err(|e| BackupError::io("finishing zstd frame", e))
}

/// Inverse of [`compress`]. All-or-nothing: any decoder error yields
/// `CorruptArchive` and no partial output.
pub fn decompress(archive: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(archive).map_err(|e| BackupError::CorruptArchive(e.to_string()))
}
