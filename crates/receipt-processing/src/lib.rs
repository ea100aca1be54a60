//! Receipt Processing Library
//!
//! Pure, synchronous checks applied to a submission: schema-driven field
//! validation and binary-signature image type detection.

pub mod fields;
pub mod image;

pub use fields::validate_fields;
pub use image::{decode_image_payload, detect_image_type, DecodedImage, DetectError, ImageSignatureDetector};
