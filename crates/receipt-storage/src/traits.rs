//! Storage abstraction traits
//!
//! This module defines the traits every table and blob backend must implement.

use async_trait::async_trait;
use receipt_core::AppError;
use serde_json::Value;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Section '{section}' not found in book '{book}'")]
    SectionNotFound { book: String, section: String },

    #[error("Malformed section data: {0}")]
    Malformed(String),

    #[error("Append failed: {0}")]
    AppendFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One row of cells as read from a table section.
pub type Row = Vec<Value>;

/// A file written into the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub folder_ref: String,
    /// Logical file name, as requested by the caller.
    pub file_name: String,
    /// Backend-specific location of the written file.
    pub location: String,
    pub size_bytes: usize,
}

/// Tabular store abstraction
///
/// A book (identified by a reference) holds named sections; each section is
/// an ordered list of rows. Implementations must make concurrent appends to
/// the same section non-conflicting.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read every row of a section, header included.
    ///
    /// Returns `Err(BookNotFound)` when the book cannot be opened and
    /// `Ok(None)` when the book exists but has no such section.
    async fn read_section(&self, book_ref: &str, section: &str) -> StorageResult<Option<Vec<Row>>>;

    /// Whether the book holds the named section.
    ///
    /// Returns `Err(BookNotFound)` when the book cannot be opened.
    async fn has_section(&self, book_ref: &str, section: &str) -> StorageResult<bool>;

    /// Append one row at the end of an existing section.
    async fn append_row(&self, book_ref: &str, section: &str, row: &[String]) -> StorageResult<()>;
}

/// Blob store abstraction
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` as `file_name` inside an existing folder.
    ///
    /// The folder is never created implicitly.
    async fn save(
        &self,
        folder_ref: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredBlob>;
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BookNotFound(msg) => AppError::NotFound(msg),
            StorageError::SectionNotFound { .. } => AppError::NotFound("Sheet not found.".to_string()),
            StorageError::Malformed(msg) | StorageError::ConfigError(msg) => {
                AppError::Configuration(msg)
            }
            StorageError::UploadFailed(msg)
            | StorageError::FolderNotFound(msg)
            | StorageError::AppendFailed(msg)
            | StorageError::InvalidKey(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
        }
    }
}
