use serde::{Deserialize, Serialize};

use super::submission::FieldRule;

/// One routing target a submission can be filed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRecord {
    /// Unique lookup key, matched exactly and case-sensitively.
    pub key: String,
    /// Human-readable name shown in client forms.
    pub label: String,
    /// Record store (book) the row is appended to.
    pub store_id: String,
    /// Table inside the record store.
    pub sheet_name: String,
    /// Blob store folder receiving attached images.
    pub folder_id: String,
}

/// Per-request configuration snapshot: active destinations plus the field schema.
///
/// Loaded fresh for every request and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub destinations: Vec<DestinationRecord>,
    pub field_schema: Vec<FieldRule>,
}

/// Destination entry exposed to clients for form population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationOption {
    pub value: String,
    pub label: String,
}

impl From<&DestinationRecord> for DestinationOption {
    fn from(record: &DestinationRecord) -> Self {
        DestinationOption {
            value: record.key.clone(),
            label: record.label.clone(),
        }
    }
}
