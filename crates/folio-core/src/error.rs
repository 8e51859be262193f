//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant describes
//! how it should be presented to a client through the `ErrorMetadata` trait, so the
//! HTTP layer only has to render what the error says about itself.

use crate::validation::FieldErrors;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rate limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_UNAVAILABLE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing JSON in request body")]
    MissingBody,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage write failed: {cause}")]
    StorageWrite {
        /// Message shown to the client
        message: String,
        /// Underlying storage failure, kept for logs
        cause: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Storage write failure with the generic client message.
    pub fn storage_write(cause: impl Into<String>) -> Self {
        AppError::StorageWrite {
            message: "An internal error occurred.".to_string(),
            cause: cause.into(),
        }
    }

    /// Per-field details for validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Variant name used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingBody => "MissingBody",
            AppError::Validation(_) => "Validation",
            AppError::RateLimited(_) => "RateLimited",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::StorageWrite { .. } => "StorageWrite",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "InternalWithSource",
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MissingBody => (400, "MISSING_BODY", false, LogLevel::Debug),
        AppError::Validation(_) => (400, "VALIDATION_FAILED", false, LogLevel::Debug),
        AppError::RateLimited(_) => (429, "RATE_LIMITED", false, LogLevel::Warn),
        AppError::StorageUnavailable(_) => (503, "STORAGE_UNAVAILABLE", true, LogLevel::Error),
        AppError::StorageWrite { .. } => (500, "STORAGE_WRITE_FAILED", true, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingBody => "Missing JSON in request body".to_string(),
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::RateLimited(policy) => format!("Rate limit exceeded: {}", policy),
            AppError::StorageUnavailable(_) => "Database connection not available".to_string(),
            AppError::StorageWrite { message, .. } => message.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An internal server error occurred.".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
