use crate::error::{HttpAppError, RESULT_DONE};
use crate::state::AppState;
use axum::{extract::State, Json};
use bytes::Bytes;
use receipt_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub result: String,
}

/// Accept one receipt submission.
///
/// The body is read as raw bytes so that form clients posting JSON as
/// `text/plain` are served the same way as `application/json` callers.
pub async fn submit_receipt(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SubmissionResponse>, HttpAppError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, size_bytes = body.len(), "Unparsable submission body");
        AppError::InvalidInput("Invalid parameter.".to_string())
    })?;

    let receipt = state.pipeline.submit(&payload).await?;
    tracing::debug!(request_id = %receipt.request_id, "Submission stored");

    Ok(Json(SubmissionResponse {
        result: RESULT_DONE.to_string(),
    }))
}
