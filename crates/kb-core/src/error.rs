//! # AppError
//!
//! Centralized error taxonomy for keiji-board. Validation and upload
//! rejections are surfaced to the caller verbatim; storage failures carry
//! their cause only for logging and must never reach a client response.

use thiserror::Error;

/// The primary error type for all kb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup by id with no matching record (e.g. posting to a dead thread).
    #[error("{0} not found with id {1}")]
    NotFound(&'static str, i64),

    /// Missing/blank required field, malformed id, or disallowed category.
    #[error("{0}")]
    Validation(String),

    /// Upload refused before storage: wrong media type or oversize payload.
    #[error("{0}")]
    UploadRejected(String),

    /// Backend I/O or query failure. The payload is the internal cause;
    /// the API layer logs it and answers with a generic message.
    #[error("internal server error")]
    Storage(String),
}

/// A specialized Result type for keiji-board logic.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_display_stays_generic() {
        let err = AppError::Storage("connection refused (10.0.0.5:5432)".into());
        assert_eq!(err.to_string(), "internal server error");
    }

    #[test]
    fn not_found_names_the_record() {
        let err = AppError::NotFound("thread", 42);
        assert_eq!(err.to_string(), "thread not found with id 42");
    }
}
