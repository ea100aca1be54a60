//! Receipt Storage Library
//!
//! This crate provides the storage collaborators of the submission pipeline:
//!
//! - [`TableStore`]: tabular books made of named sections (rows of cells). It
//!   backs both the configuration store (read) and the record store (append).
//! - [`BlobStore`]: folders of binary files receiving receipt images.
//!
//! References (book, section, folder) are single path segments: they must not
//! be empty, contain `..`, or contain a path separator. Validation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod cells;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-local")]
pub mod local_table;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_blob_store, create_table_store};
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
#[cfg(feature = "storage-local")]
pub use local_table::LocalTableStore;
pub use traits::{BlobStore, Row, StorageError, StorageResult, StoredBlob, TableStore};
