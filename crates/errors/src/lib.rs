#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the apkforge plan compiler
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so compile failures can be cached and
//! reported by the invocation layer without losing detail.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod not_found;
pub mod precondition;
pub mod schema;
pub mod validation;

// Re-export all error types at the root
pub use config::ConfigError;
pub use not_found::NotFoundError;
pub use precondition::PreconditionError;
pub use schema::SchemaError;
pub use validation::ValidationError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for apkforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    ///
    /// Compilation is pure, so nothing in this crate is retryable except
    /// plain I/O at the edges.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Schema(err) => err.user_message(),
            Error::Validation(err) => err.user_message(),
            Error::NotFound(err) => err.user_message(),
            Error::Precondition(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Schema(err) => err.user_hint(),
            Error::Validation(err) => err.user_hint(),
            Error::NotFound(err) => err.user_hint(),
            Error::Precondition(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Schema(err) => err.user_code(),
            Error::Validation(err) => err.user_code(),
            Error::NotFound(err) => err.user_code(),
            Error::Precondition(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
