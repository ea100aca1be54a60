//! Application setup and initialization
//!
//! Kept out of main.rs so integration tests can build the same router.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::Result;
use receipt_core::Settings;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(settings: Settings) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %settings.environment,
        field_schema_source = %settings.field_schema_source,
        unknown_image_policy = %settings.unknown_image_policy,
        "Configuration loaded and validated successfully"
    );

    let state = services::initialize_services(&settings).await?;

    let router = routes::setup_routes(&settings, state.clone())?;

    Ok((state, router))
}
