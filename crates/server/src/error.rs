//! Server Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A server error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The built-in page template failed to compile or render.
    #[display("page template is broken")]
    Template,
    /// Could not listen on the requested address (in use, not permitted, or
    /// not resolvable).
    #[display("cannot listen on {_0}")]
    Bind(#[error(not(source))] String),
    /// The server stopped with an I/O error.
    #[display("server failed")]
    Serve,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Bind(_))
    }
}
