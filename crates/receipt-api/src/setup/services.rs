//! Collaborator and pipeline wiring

use crate::state::AppState;
use anyhow::{Context, Result};
use receipt_core::Settings;
use receipt_services::SubmissionPipeline;
use receipt_storage::{create_blob_store, create_table_store};
use std::sync::Arc;

/// Build the storage backends and the submission pipeline.
pub async fn initialize_services(settings: &Settings) -> Result<Arc<AppState>> {
    let tables = create_table_store(settings)
        .await
        .context("Failed to initialize table store")?;
    let blobs = create_blob_store(settings)
        .await
        .context("Failed to initialize blob store")?;

    let pipeline = SubmissionPipeline::new(settings, tables, blobs)
        .context("Failed to initialize submission pipeline")?;

    tracing::info!(
        config_store_ref = %settings.config_store_ref,
        score_threshold = settings.recaptcha_score_threshold,
        "Submission pipeline ready"
    );

    Ok(Arc::new(AppState::new(pipeline)))
}
