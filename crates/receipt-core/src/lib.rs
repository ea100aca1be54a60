//! Receipt Core Library
//!
//! This crate provides the domain models, error types and process settings
//! shared by every receipt intake component.

pub mod error;
pub mod models;
pub mod settings;

// Re-export commonly used types
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AcceptedValue, Configuration, DestinationOption, DestinationRecord, DetectedImage, FieldRule,
    FieldValue, SubmissionInput, ValidationOutcome,
};
pub use settings::{SchemaSource, Settings, UnknownImagePolicy};
