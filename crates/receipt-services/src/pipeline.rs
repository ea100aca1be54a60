//! Submission pipeline
//!
//! One request runs sequentially through: parse, load configuration,
//! validate fields, abuse gate, resolve destination, persist the attachment,
//! append the record. The first failing step ends the request. The record
//! table is confirmed while resolving, so a missing table never leaves an
//! image behind. The row append is the only durable commit and happens last.

use crate::recaptcha::RecaptchaVerifier;
use crate::resolver::{find_destination, ConfigurationResolver};
use crate::schema::schema_provider;
use anyhow::Result;
use receipt_core::{AppError, DestinationOption, Settings, SubmissionInput, ValidationOutcome};
use receipt_processing::{validate_fields, ImageSignatureDetector};
use receipt_storage::{BlobStore, StorageError, StoredBlob, TableStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

const INVALID_PARAMETER: &str = "Invalid parameter.";

const DESTINATION_FIELD: &str = "destination";
const TOKEN_FIELD: &str = "recaptchaToken";
const IMAGE_FIELD: &str = "receiptImage";
const NO_IMAGE_REASON_FIELD: &str = "noImageReason";
const NOTE_FIELD: &str = "note";

/// Validated fields that get their own trailing slot in the record row.
const TRAILING_FIELDS: [&str; 2] = [NOTE_FIELD, NO_IMAGE_REASON_FIELD];

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub request_id: Uuid,
    pub destination: String,
    /// Persisted receipt field: the stored file name or the no-image reason.
    pub receipt: String,
    pub row: Vec<String>,
    pub image: Option<StoredBlob>,
}

enum Attachment {
    Image(String),
    NoImage(String),
}

struct ParsedRequest {
    input: SubmissionInput,
    destination_key: String,
    proof_token: String,
    attachment: Attachment,
}

fn present(input: &SubmissionInput, name: &str) -> Option<String> {
    input
        .text(name)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

fn invalid_parameter() -> AppError {
    AppError::InvalidInput(INVALID_PARAMETER.to_string())
}

/// Structural checks only; nothing external is touched.
fn parse_request(body: &Value) -> Result<ParsedRequest, AppError> {
    let input = SubmissionInput::from_json(body).map_err(|_| invalid_parameter())?;

    let destination_key = present(&input, DESTINATION_FIELD);
    let proof_token = present(&input, TOKEN_FIELD);
    // an image wins over a no-image reason when both are sent
    let attachment = present(&input, IMAGE_FIELD)
        .map(Attachment::Image)
        .or_else(|| present(&input, NO_IMAGE_REASON_FIELD).map(Attachment::NoImage));

    match (destination_key, proof_token, attachment) {
        (Some(destination_key), Some(proof_token), Some(attachment)) => Ok(ParsedRequest {
            input,
            destination_key,
            proof_token,
            attachment,
        }),
        _ => Err(invalid_parameter()),
    }
}

fn receipt_file_name(outcome: &ValidationOutcome, extension: &str) -> String {
    let field = |name: &str| outcome.get(name).unwrap_or_default();
    format!(
        "{}_{}_{}.{}",
        field("date"),
        field("name"),
        field("detail"),
        extension
    )
}

/// Accepted values in schema order, then the receipt, then the note.
fn record_row(outcome: &ValidationOutcome, receipt: &str) -> Vec<String> {
    let mut row: Vec<String> = outcome
        .values
        .iter()
        .filter(|accepted| !TRAILING_FIELDS.contains(&accepted.name.as_str()))
        .map(|accepted| accepted.value.clone())
        .collect();
    row.push(receipt.to_string());
    row.push(outcome.get(NOTE_FIELD).unwrap_or_default().to_string());
    row
}

pub struct SubmissionPipeline {
    config_store_ref: String,
    recaptcha_secret: String,
    score_threshold: f64,
    resolver: ConfigurationResolver,
    verifier: RecaptchaVerifier,
    detector: ImageSignatureDetector,
    tables: Arc<dyn TableStore>,
    blobs: Arc<dyn BlobStore>,
}

impl SubmissionPipeline {
    pub fn new(
        settings: &Settings,
        tables: Arc<dyn TableStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        let verifier = RecaptchaVerifier::new(
            settings.recaptcha_verify_url.clone(),
            Duration::from_secs(settings.recaptcha_timeout_secs),
        )?;
        let schema = schema_provider(settings.field_schema_source, tables.clone());

        Ok(Self {
            config_store_ref: settings.config_store_ref.clone(),
            recaptcha_secret: settings.recaptcha_secret.clone(),
            score_threshold: settings.recaptcha_score_threshold,
            resolver: ConfigurationResolver::new(tables.clone(), schema),
            verifier,
            detector: ImageSignatureDetector::new(settings.unknown_image_policy),
            tables,
            blobs,
        })
    }

    /// Run one submission to completion.
    pub async fn submit(&self, body: &Value) -> Result<SubmissionReceipt, AppError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "submission",
            %request_id,
            destination = tracing::field::Empty
        );
        self.process(body, request_id).instrument(span).await
    }

    /// Active destinations for client form population.
    pub async fn list_destinations(&self) -> Result<Vec<DestinationOption>, AppError> {
        self.resolver.list_destinations(&self.config_store_ref).await
    }

    async fn process(&self, body: &Value, request_id: Uuid) -> Result<SubmissionReceipt, AppError> {
        let request = parse_request(body)?;
        tracing::Span::current().record("destination", request.destination_key.as_str());
        tracing::debug!("Request parsed");

        let config = self
            .resolver
            .load_configuration(&self.config_store_ref)
            .await?;

        let outcome = validate_fields(&request.input, &config.field_schema);
        if !outcome.is_valid() {
            return Err(AppError::Validation(outcome.errors));
        }
        tracing::debug!(fields = outcome.values.len(), "Fields validated");

        self.verifier
            .verify(&self.recaptcha_secret, &request.proof_token, self.score_threshold)
            .await?;

        let destination = find_destination(&config, &request.destination_key)?;
        tracing::debug!(
            store = %destination.store_id,
            table = %destination.sheet_name,
            "Destination resolved"
        );

        if !self
            .tables
            .has_section(&destination.store_id, &destination.sheet_name)
            .await?
        {
            return Err(StorageError::SectionNotFound {
                book: destination.store_id.clone(),
                section: destination.sheet_name.clone(),
            }
            .into());
        }

        let (receipt, image) = match &request.attachment {
            Attachment::Image(payload) => {
                let decoded = self.detector.decode_and_detect(payload)?;
                let file_name = receipt_file_name(&outcome, decoded.detected.extension);
                let stored = self
                    .blobs
                    .save(
                        &destination.folder_id,
                        &file_name,
                        decoded.detected.mime_type,
                        decoded.bytes,
                    )
                    .await?;
                (file_name, Some(stored))
            }
            Attachment::NoImage(reason) => (
                outcome
                    .get(NO_IMAGE_REASON_FIELD)
                    .unwrap_or(reason.as_str())
                    .to_string(),
                None,
            ),
        };

        let row = record_row(&outcome, &receipt);
        if let Err(e) = self
            .tables
            .append_row(&destination.store_id, &destination.sheet_name, &row)
            .await
        {
            if let Some(blob) = &image {
                tracing::warn!(
                    folder = %blob.folder_ref,
                    file_name = %blob.file_name,
                    error = %e,
                    "orphaned receipt image"
                );
            }
            return Err(e.into());
        }

        tracing::info!(
            cells = row.len(),
            with_image = image.is_some(),
            "Submission accepted"
        );

        Ok(SubmissionReceipt {
            request_id,
            destination: destination.key.clone(),
            receipt,
            row,
            image,
        })
    }
}
