//! Utility modules shared by the library and the CLI.

pub mod errors;
pub mod format;
pub mod logger;

pub use errors::{BackupError, ErrorCode, Result};
