//! Checksum and compression codec for snapshot archives.

pub mod checksum;
pub mod compress;

pub use checksum::{checksum, is_valid_digest};
pub use compress::{compress, decompress, DEFAULT_LEVEL};
