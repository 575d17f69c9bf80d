//! Common error types used throughout reelvault.
//!
//! This module provides a unified error type covering the failure cases the
//! catalog can surface: missing records, rejected input, provider failures,
//! and I/O problems at the snapshot boundary.

/// Common error type for reelvault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested record (or external id) was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The external metadata provider failed (transport or provider-side
    /// error, distinct from a clean "not found" answer).
    #[error("Provider error: {0}")]
    Provider(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new Provider error.
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
