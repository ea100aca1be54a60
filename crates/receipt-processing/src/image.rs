//! Image type detection from binary signatures.
//!
//! Only the leading bytes are inspected, so truncated payloads never panic.
//! Caller-supplied MIME types are ignored.

use base64::Engine;
use receipt_core::{AppError, DetectedImage, UnknownImagePolicy};
use regex::Regex;
use std::sync::LazyLock;

static DATA_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/[a-z]+;base64,").expect("static regex is valid"));

/// Image detection errors
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Base64 data is required and must be a non-empty string.")]
    Empty,

    #[error("Invalid base64 data format.")]
    EmptyAfterPrefix,

    #[error("Failed to decode base64 data: {0}")]
    Decode(String),

    #[error("Unrecognized image format.")]
    Unrecognized,
}

impl From<DetectError> for AppError {
    fn from(err: DetectError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Decoded attachment plus its detected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub detected: DetectedImage,
}

fn match_signature(bytes: &[u8]) -> Option<DetectedImage> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(DetectedImage::JPEG);
    }
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some(DetectedImage::PNG);
    }
    if bytes.starts_with(&[0x47, 0x49, 0x46]) {
        return Some(DetectedImage::GIF);
    }
    // RIFF container with a WEBP form type at offset 8
    if bytes.starts_with(&[0x52, 0x49, 0x46, 0x46])
        && bytes.get(8..12) == Some(&b"WEBP"[..])
    {
        return Some(DetectedImage::WEBP);
    }
    None
}

/// Classify a binary payload, falling back to JPEG for unknown signatures.
pub fn detect_image_type(bytes: &[u8]) -> Result<DetectedImage, DetectError> {
    ImageSignatureDetector::default().detect(bytes)
}

/// Strip an optional `data:image/...;base64,` prefix and decode the payload.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, DetectError> {
    if payload.trim().is_empty() {
        return Err(DetectError::Empty);
    }

    let clean = DATA_URL_PREFIX.replace(payload, "");
    let clean: String = clean.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if clean.is_empty() {
        return Err(DetectError::EmptyAfterPrefix);
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(clean.as_bytes())
        .map_err(|e| DetectError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(DetectError::Empty);
    }
    Ok(bytes)
}

/// Signature-based detector with a configurable policy for unknown formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSignatureDetector {
    policy: UnknownImagePolicy,
}

impl ImageSignatureDetector {
    pub fn new(policy: UnknownImagePolicy) -> Self {
        Self { policy }
    }

    pub fn detect(&self, bytes: &[u8]) -> Result<DetectedImage, DetectError> {
        if bytes.is_empty() {
            return Err(DetectError::Empty);
        }

        match (match_signature(bytes), self.policy) {
            (Some(detected), _) => Ok(detected),
            (None, UnknownImagePolicy::FallbackJpeg) => {
                tracing::debug!(
                    leading_bytes = ?&bytes[..bytes.len().min(12)],
                    "Unknown image signature, labelling as JPEG"
                );
                Ok(DetectedImage::JPEG)
            }
            (None, UnknownImagePolicy::Reject) => Err(DetectError::Unrecognized),
        }
    }

    /// Decode a transport-encoded payload and detect its type.
    pub fn decode_and_detect(&self, payload: &str) -> Result<DecodedImage, DetectError> {
        let bytes = decode_image_payload(payload)?;
        let detected = self.detect(&bytes)?;
        Ok(DecodedImage { bytes, detected })
    }
}
