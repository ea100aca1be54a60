#[cfg(feature = "storage-local")]
use crate::{LocalBlobStore, LocalTableStore};
use crate::{BlobStore, StorageResult, TableStore};
#[cfg(not(feature = "storage-local"))]
use crate::StorageError;
use receipt_core::Settings;
use std::sync::Arc;

/// Create the table store (configuration and record store) from settings
pub async fn create_table_store(settings: &Settings) -> StorageResult<Arc<dyn TableStore>> {
    #[cfg(feature = "storage-local")]
    {
        let store = LocalTableStore::new(&settings.table_store_path).await?;
        tracing::info!(path = %settings.table_store_path, "Using local table store");
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "storage-local"))]
    {
        let _ = settings;
        Err(StorageError::ConfigError(
            "Local table store not available (storage-local feature not enabled)".to_string(),
        ))
    }
}

/// Create the blob store receiving receipt images from settings
pub async fn create_blob_store(settings: &Settings) -> StorageResult<Arc<dyn BlobStore>> {
    #[cfg(feature = "storage-local")]
    {
        let store = LocalBlobStore::new(&settings.blob_store_path).await?;
        tracing::info!(path = %settings.blob_store_path, "Using local blob store");
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "storage-local"))]
    {
        let _ = settings;
        Err(StorageError::ConfigError(
            "Local blob store not available (storage-local feature not enabled)".to_string(),
        ))
    }
}
