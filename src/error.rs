//! Error taxonomy for session documents and request execution.
//!
//! Both enums are `Clone` so they can travel back to the app layer inside
//! channel messages.

use std::path::PathBuf;

/// Failures of Session Document operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("{path} is not a valid session file: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("no request at index {index} (session has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid method: {0} (expected GET, POST, PUT or DELETE)")]
    InvalidMethod(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        SessionError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Failures of the HTTP Executor.
///
/// A non-2xx status is not an error; only a URL that cannot be dispatched or
/// a transport failure ends up here.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for ExecutionError {
    fn from(e: reqwest::Error) -> Self {
        let msg = if e.is_timeout() {
            format!("Request timed out: {}", e)
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            format!("Request failed: {}", e)
        };
        ExecutionError::Transport(msg)
    }
}
