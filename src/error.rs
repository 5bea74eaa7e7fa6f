//! Unified library error model and mapping helpers.
//! Callers (RPC/HTTP frontends of the surrounding platform) map these onto their own
//! status codes via `http_status`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryError {
    #[error("{code}: {message}")]
    Authorization { code: String, message: String },
    #[error("{code}: {message}")]
    NotFound { code: String, message: String },
    #[error("{code}: {message}")]
    Transient { code: String, message: String },
    #[error("{code}: {message}")]
    InvalidArgument { code: String, message: String },
}

impl LibraryError {
    pub fn code_str(&self) -> &str {
        match self {
            LibraryError::Authorization { code, .. }
            | LibraryError::NotFound { code, .. }
            | LibraryError::Transient { code, .. }
            | LibraryError::InvalidArgument { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LibraryError::Authorization { message, .. }
            | LibraryError::NotFound { message, .. }
            | LibraryError::Transient { message, .. }
            | LibraryError::InvalidArgument { message, .. } => message.as_str(),
        }
    }

    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { LibraryError::Authorization { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { LibraryError::NotFound { code: code.into(), message: msg.into() } }
    pub fn transient<S: Into<String>>(code: S, msg: S) -> Self { LibraryError::Transient { code: code.into(), message: msg.into() } }
    pub fn invalid<S: Into<String>>(code: S, msg: S) -> Self { LibraryError::InvalidArgument { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            LibraryError::Authorization { .. } => 401,
            LibraryError::NotFound { .. } => 404,
            LibraryError::Transient { .. } => 503,
            LibraryError::InvalidArgument { .. } => 400,
        }
    }

    /// Only store outages are worth retrying; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LibraryError::Transient { .. })
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;

impl From<StoreError> for LibraryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => LibraryError::not_found("not_found".to_string(), format!("{} does not exist", id)),
            StoreError::Unavailable(msg) => LibraryError::transient("store_unavailable".to_string(), msg),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
