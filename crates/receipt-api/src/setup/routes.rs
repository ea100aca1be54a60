//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers::{destinations, health, submission};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use receipt_core::Settings;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(settings: &Settings, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(settings)?;

    let app = app_routes(state)
        // the tower-http limit replaces axum's 2 MB extractor default
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_request_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn app_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            "/",
            post(submission::submit_receipt).get(destinations::list_destinations),
        )
        .route(
            &format!("{}/submissions", API_PREFIX),
            post(submission::submit_receipt),
        )
        .route(
            &format!("{}/destinations", API_PREFIX),
            get(destinations::list_destinations),
        )
        .route("/health", get(health::liveness_check))
        .with_state(state)
}

fn setup_cors(settings: &Settings) -> Result<CorsLayer, anyhow::Error> {
    let cors = if settings.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = settings
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("CORS_ORIGINS contains an invalid origin")?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
