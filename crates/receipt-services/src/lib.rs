//! Receipt Services Layer
//!
//! This crate is the business service layer: the abuse score gate, the
//! configuration resolver with its schema providers, and the submission
//! pipeline that composes them with the storage collaborators. Keep thin
//! HTTP handling in receipt-api.

pub mod pipeline;
pub mod recaptcha;
pub mod resolver;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use pipeline::{SubmissionPipeline, SubmissionReceipt};
pub use recaptcha::{RecaptchaVerifier, VerificationError, VerificationResponse};
pub use resolver::{find_destination, ConfigurationResolver};
pub use schema::{schema_provider, SchemaProvider, StaticSchema, TableSchema};
pub use receipt_storage::{BlobStore, StorageError, TableStore};
