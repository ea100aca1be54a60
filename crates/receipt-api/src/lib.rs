//! Receipt API Library
//!
//! This crate provides the HTTP handlers and application setup around the
//! submission pipeline.

pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::{DestinationsResponse, SubmissionResponse};
