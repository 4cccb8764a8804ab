//! SHA-256 content hashing.
//!
//! The digest is always taken over the uncompressed bytes, so the same
//! payload yields the same checksum regardless of compression level.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`. Deterministic.
pub fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Shape check for digests read back from the journal. An entry failing it
/// can never verify.
pub fn is_valid_digest(digest: &str) -> bool {
    digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit())
}
