//! Error types module
//!
//! All request-level failures are unified under the `AppError` enum. Each
//! variant corresponds to one failure category of the submission pipeline and
//! is rendered at the HTTP boundary as `{ result: "error", error: <message> }`.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected but well-formed requests
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message placed into the response body
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed call into a component or malformed request envelope.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every field rule violation collected for one submission.
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Variant name, used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Validation(_) => "Validation",
            AppError::VerificationFailed(_) => "VerificationFailed",
            AppError::Upstream(_) => "Upstream",
            AppError::Configuration(_) => "Configuration",
            AppError::NotFound(_) => "NotFound",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Static metadata for each variant: (error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, LogLevel) {
    match err {
        AppError::InvalidInput(_) => ("INVALID_INPUT", LogLevel::Debug),
        AppError::Validation(_) => ("VALIDATION_ERROR", LogLevel::Debug),
        AppError::VerificationFailed(_) => ("VERIFICATION_FAILED", LogLevel::Warn),
        AppError::Upstream(_) => ("UPSTREAM_ERROR", LogLevel::Error),
        AppError::Configuration(_) => ("CONFIGURATION_ERROR", LogLevel::Error),
        AppError::NotFound(_) => ("NOT_FOUND", LogLevel::Warn),
        AppError::Storage(_) => ("STORAGE_ERROR", LogLevel::Error),
        AppError::Internal(_) => ("INTERNAL_ERROR", LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(errors) => errors.join(" "),
            AppError::InvalidInput(msg)
            | AppError::VerificationFailed(msg)
            | AppError::Upstream(msg)
            | AppError::Configuration(msg)
            | AppError::NotFound(msg)
            | AppError::Storage(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).1
    }
}
