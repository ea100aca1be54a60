//! Abuse score gate backed by the reCAPTCHA v3 verification API.
//!
//! One outbound call per invocation: no retries and no caching.

use anyhow::{Context, Result};
use receipt_core::AppError;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

/// Verification errors
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The gate was called with unusable arguments.
    #[error("{0}")]
    InvalidInput(String),

    /// The verification service could not be reached or answered nonsense.
    #[error("{0}")]
    Upstream(String),

    /// The token was rejected or scored below the threshold.
    #[error("{0}")]
    Failed(String),
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::InvalidInput(msg) => AppError::InvalidInput(msg),
            VerificationError::Upstream(msg) => AppError::Upstream(msg),
            VerificationError::Failed(msg) => AppError::VerificationFailed(msg),
        }
    }
}

/// Parsed verification answer.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResponse {
    pub success: bool,
    pub score: f64,
    pub action: Option<String>,
    pub challenge_ts: Option<String>,
    pub hostname: Option<String>,
    pub error_codes: Vec<String>,
}

/// Client for the verification endpoint
pub struct RecaptchaVerifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RecaptchaVerifier")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn optional_string(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(String::from)
}

impl RecaptchaVerifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for reCAPTCHA API")?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Verify a proof token and gate on its score.
    ///
    /// `score == score_threshold` passes; anything strictly lower fails.
    #[tracing::instrument(skip(self, secret, token), fields(endpoint = %self.endpoint))]
    pub async fn verify(
        &self,
        secret: &str,
        token: &str,
        score_threshold: f64,
    ) -> Result<VerificationResponse, VerificationError> {
        if secret.trim().is_empty() {
            return Err(VerificationError::InvalidInput(
                "secret parameter must be a non-empty string.".to_string(),
            ));
        }
        if token.trim().is_empty() {
            return Err(VerificationError::InvalidInput(
                "token parameter (user response token) must be a non-empty string.".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&score_threshold) {
            return Err(VerificationError::InvalidInput(format!(
                "score threshold must be within [0, 1], got {}.",
                score_threshold
            )));
        }

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await
            .map_err(|e| {
                VerificationError::Upstream(format!(
                    "Failed to connect to reCAPTCHA API. Please check network connection and API endpoint. Original error: {}",
                    e
                ))
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| {
            VerificationError::Upstream(format!("Failed to read reCAPTCHA API response: {}", e))
        })?;

        if status != StatusCode::OK {
            return Err(VerificationError::Upstream(format!(
                "Failed to verify reCAPTCHA. The API returned HTTP status {}. Response: {}",
                status.as_u16(),
                body_text
            )));
        }

        let body: Value = serde_json::from_str(&body_text).map_err(|e| {
            VerificationError::Upstream(format!(
                "Failed to parse reCAPTCHA API response. Ensure the API is returning valid JSON. Original error: {}",
                e
            ))
        })?;

        let success = body.get("success").and_then(Value::as_bool).ok_or_else(|| {
            VerificationError::Upstream(
                "reCAPTCHA API response lacks a boolean \"success\" field.".to_string(),
            )
        })?;

        let error_codes: Vec<String> = body
            .get("error-codes")
            .and_then(Value::as_array)
            .map(|codes| {
                codes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if !success {
            tracing::warn!(error_codes = ?error_codes, "reCAPTCHA token rejected");
            return Err(VerificationError::Failed(if error_codes.is_empty() {
                "reCAPTCHA verification failed.".to_string()
            } else {
                format!("reCAPTCHA verification failed: {}.", error_codes.join(", "))
            }));
        }

        let score = body.get("score").and_then(Value::as_f64).ok_or_else(|| {
            VerificationError::Upstream(
                "reCAPTCHA API response lacks a numeric \"score\" field.".to_string(),
            )
        })?;

        if score < score_threshold {
            tracing::warn!(score, score_threshold, "reCAPTCHA score below threshold");
            return Err(VerificationError::Failed(format!(
                "reCAPTCHA score {} is below the threshold {}.",
                score, score_threshold
            )));
        }

        tracing::debug!(score, "reCAPTCHA verification passed");

        Ok(VerificationResponse {
            success,
            score,
            action: optional_string(&body, "action"),
            challenge_ts: optional_string(&body, "challenge_ts"),
            hostname: optional_string(&body, "hostname"),
            error_codes,
        })
    }
}
