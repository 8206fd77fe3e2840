//! Backend error types.

use thiserror::Error;

/// Errors that can occur when talking to an exam source or result store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected our credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// A local file operation failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
