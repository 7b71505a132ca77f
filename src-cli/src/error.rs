//! Error types for the command line application

use lock_engine::LockError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from handling one request
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Lock(e) => e.kind(),
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for request handling
pub type Result<T> = std::result::Result<T, AppError>;

/// Error body reported to the caller of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: String,
}

impl From<&AppError> for ErrorPayload {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}
