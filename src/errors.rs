//! # Error Handling
//!
//! This module defines the application error taxonomy and its mapping to HTTP
//! responses. Every handler funnels failures through [`AppError`] so clients
//! always receive a structured `{"error": "..."}` body with an appropriate
//! status code, and nothing escapes as an unhandled rejection.

use serde_json::json;
use thiserror::Error;
use worker::{Error as WorkerError, Response};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Missing field: {field}")]
    MissingField { field: String },
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("File size {size} exceeds maximum allowed size {max}")]
    FileSizeExceeded { size: u64, max: u64 },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::MissingField { .. } | AppError::InvalidField { .. } => 400,
            AppError::FileSizeExceeded { .. } => 413,
            AppError::Worker(_) | AppError::Database(_) | AppError::Internal(_) => 500,
        }
    }

    /// Converts the error into a structured JSON response.
    ///
    /// The body shape (`{"error": "..."}`) is what the dashboard reads when a
    /// request fails, so it must stay stable across all error kinds.
    pub fn to_response(&self) -> worker::Result<Response> {
        let body = json!({ "error": self.to_string() });
        Ok(Response::from_json(&body)?.with_status(self.status_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound("company abc".into()).status_code(), 404);
    }

    #[test]
    fn validation_errors_map_to_400() {
        let missing = AppError::MissingField {
            field: "month".into(),
        };
        let invalid = AppError::InvalidField {
            field: "quarter".into(),
            reason: "must be between 1 and 4".into(),
        };
        assert_eq!(missing.status_code(), 400);
        assert_eq!(invalid.status_code(), 400);
    }

    #[test]
    fn oversized_upload_maps_to_413() {
        let err = AppError::FileSizeExceeded { size: 30, max: 10 };
        assert_eq!(err.status_code(), 413);
        assert!(err.to_string().contains("30"));
    }
}
