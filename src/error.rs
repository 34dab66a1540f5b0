// src/error.rs

//! Unified error handling for the job board application.

use std::fmt;

use thiserror::Error;

/// Result type alias for job board operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// SQLite statement failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The backing store could not be opened at all
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The job search provider was unreachable or returned garbage
    #[error("Provider error for {context}: {message}")]
    Provider { context: String, message: String },

    /// An ingestion run ended in the failed state
    #[error("Ingestion run failed: {0}")]
    RunFailed(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a provider error with context (usually the search task).
    pub fn provider(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Provider {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a storage-unavailable error.
    pub fn storage_unavailable(message: impl fmt::Display) -> Self {
        Self::StorageUnavailable(message.to_string())
    }


    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the pipeline may skip past this error and continue with the next task.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Http(_) | Self::Json(_) | Self::Url(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_are_recoverable() {
        let err = AppError::provider("Corporate Trainer @ Remote", "connection refused");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Provider error for Corporate Trainer @ Remote: connection refused"
        );
    }

    #[test]
    fn storage_errors_are_fatal() {
        assert!(!AppError::storage_unavailable("disk gone").is_recoverable());
        assert!(!AppError::Storage(rusqlite::Error::InvalidQuery).is_recoverable());
    }
}
