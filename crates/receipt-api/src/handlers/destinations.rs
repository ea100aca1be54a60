use crate::error::{HttpAppError, RESULT_DONE};
use crate::state::AppState;
use axum::{extract::State, Json};
use receipt_core::DestinationOption;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct DestinationsResponse {
    pub result: String,
    pub data: Vec<DestinationOption>,
}

/// List active destinations as `{value, label}` pairs for form population.
pub async fn list_destinations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DestinationsResponse>, HttpAppError> {
    let data = state.pipeline.list_destinations().await?;

    Ok(Json(DestinationsResponse {
        result: RESULT_DONE.to_string(),
        data,
    }))
}
