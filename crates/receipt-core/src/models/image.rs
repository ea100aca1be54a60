use std::fmt::{Display, Formatter, Result as FmtResult};

/// Image format derived from the leading bytes of a payload.
///
/// Never built from caller-supplied metadata; the detector is the only source
/// of the persisted file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedImage {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

impl DetectedImage {
    pub const JPEG: DetectedImage = DetectedImage {
        mime_type: "image/jpeg",
        extension: "jpg",
    };
    pub const PNG: DetectedImage = DetectedImage {
        mime_type: "image/png",
        extension: "png",
    };
    pub const GIF: DetectedImage = DetectedImage {
        mime_type: "image/gif",
        extension: "gif",
    };
    pub const WEBP: DetectedImage = DetectedImage {
        mime_type: "image/webp",
        extension: "webp",
    };
}

impl Display for DetectedImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} (.{})", self.mime_type, self.extension)
    }
}
