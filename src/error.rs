//! CLI Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("cannot load configuration")]
    Config,
    #[display("cannot open registry database: {}", _0.display())]
    Database(#[error(not(source))] PathBuf),
    #[display("registry operation failed")]
    Links,
    #[display("server failed")]
    Server,
    #[display("invalid port: {_0}")]
    InvalidPort(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Server)
    }
}
