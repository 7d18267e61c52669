//! Link Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A link error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The registry database failed; nothing about the link can be trusted.
    #[display("registry unavailable")]
    Registry,
    /// The path could not be resolved to an absolute location.
    #[display("cannot resolve path: {}", _0.display())]
    Path(#[error(not(source))] PathBuf),
    /// The file exists but could not be measured or hashed.
    #[display("cannot fingerprint file: {}", _0.display())]
    Fingerprint(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Registry)
    }
}
