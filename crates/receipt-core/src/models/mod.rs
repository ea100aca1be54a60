//! Domain models for submissions, field schemas and routing destinations.

pub mod destination;
pub mod image;
pub mod submission;

pub use destination::{Configuration, DestinationOption, DestinationRecord};
pub use image::DetectedImage;
pub use submission::{AcceptedValue, FieldRule, FieldValue, SubmissionInput, ValidationOutcome};
