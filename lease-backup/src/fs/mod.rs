//! Filesystem helpers.

pub mod atomic;

pub use atomic::{staging_path, write_atomic, write_synced};
