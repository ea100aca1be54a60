//! HTTP error response conversion
//!
//! Failures are reported in the body, never through the status code: every
//! error renders as `200 { "result": "error", "error": <message> }`.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>` and use `?` on
//! anything convertible into `AppError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use receipt_core::{AppError, ErrorMetadata, LogLevel};
use serde::{Deserialize, Serialize};

pub const RESULT_DONE: &str = "done";
pub const RESULT_ERROR: &str = "error";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub result: String,
    pub error: String,
}

/// Wrapper type for AppError that implements IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::Internal(err.to_string()))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, code = code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, code = code, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, code = code, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        log_error(app_error);

        // Internal errors may carry paths and OS messages
        let error = if is_production_env() && matches!(app_error, AppError::Internal(_)) {
            "Internal server error.".to_string()
        } else {
            app_error.client_message()
        };

        (
            StatusCode::OK,
            Json(ErrorResponse {
                result: RESULT_ERROR.to_string(),
                error,
            }),
        )
            .into_response()
    }
}
