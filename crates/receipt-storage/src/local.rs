use crate::keys::{disk_file_name, validate_segment};
use crate::traits::{BlobStore, StorageError, StorageResult, StoredBlob};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Local filesystem blob store
///
/// Each folder reference is a directory directly under `base_path`. Folders
/// are provisioned out of band; [`LocalBlobStore::create_folder`] exists for
/// setup scripts and tests.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one sub-directory per folder reference
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create blob storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore { base_path })
    }

    /// Provision a folder so that files can be saved into it.
    pub async fn create_folder(&self, folder_ref: &str) -> StorageResult<PathBuf> {
        validate_segment("Folder ID", folder_ref)?;
        let path = self.base_path.join(folder_ref);
        fs::create_dir_all(&path).await?;
        Ok(path)
    }

    fn folder_path(&self, folder_ref: &str) -> StorageResult<PathBuf> {
        validate_segment("Folder ID", folder_ref)?;
        Ok(self.base_path.join(folder_ref))
    }
}

/// Create `disk_name` inside `folder` without replacing an existing file.
///
/// A taken name gets a `_1`, `_2`, ... suffix in front of its extension.
async fn create_unique(folder: &Path, disk_name: &str) -> std::io::Result<(fs::File, PathBuf)> {
    let name = Path::new(disk_name);
    let stem = name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(disk_name);
    let extension = name.extension().and_then(|s| s.to_str());

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = match (attempt, extension) {
            (0, _) => disk_name.to_string(),
            (n, Some(ext)) => format!("{}_{}.{}", stem, n, ext),
            (n, None) => format!("{}_{}", stem, n),
        };
        let path = folder.join(candidate);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for \"{}\" after {} attempts", disk_name, MAX_NAME_ATTEMPTS),
    ))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(
        &self,
        folder_ref: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredBlob> {
        let folder = self.folder_path(folder_ref)?;
        if file_name.trim().is_empty() {
            return Err(StorageError::InvalidKey(
                "File name is required and must be a non-empty string.".to_string(),
            ));
        }
        let disk_name = disk_file_name(file_name)?;

        let is_dir = fs::metadata(&folder)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(StorageError::FolderNotFound(format!(
                "Folder not found or inaccessible with ID \"{}\".",
                folder_ref
            )));
        }

        let size = data.len();
        let start = std::time::Instant::now();
        let upload_failed = |e: std::io::Error| {
            StorageError::UploadFailed(format!(
                "Error saving image \"{}\" to folder ID \"{}\". Original error: {}",
                file_name, folder_ref, e
            ))
        };

        let (mut file, path) = create_unique(&folder, &disk_name).await.map_err(upload_failed)?;
        let write = async {
            file.write_all(&data).await?;
            file.sync_all().await
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&path).await;
            return Err(upload_failed(e));
        }

        tracing::info!(
            path = %path.display(),
            folder = %folder_ref,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local blob store write successful"
        );

        Ok(StoredBlob {
            folder_ref: folder_ref.to_string(),
            file_name: file_name.to_string(),
            location: path.display().to_string(),
            size_bytes: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_into_existing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        store.create_folder("receipts").await.unwrap();

        let blob = store
            .save("receipts", "2024-05-01_Bob_Taxi.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(blob.file_name, "2024-05-01_Bob_Taxi.png");
        assert_eq!(blob.size_bytes, 3);
        let written = std::fs::read(dir.path().join("receipts/2024-05-01_Bob_Taxi.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_save_keeps_logical_name_with_separators() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        store.create_folder("receipts").await.unwrap();

        let blob = store
            .save("receipts", "2024/05/01_Bob_Taxi.jpg", "image/jpeg", vec![0xFF])
            .await
            .unwrap();

        assert_eq!(blob.file_name, "2024/05/01_Bob_Taxi.jpg");
        assert!(dir.path().join("receipts/2024_05_01_Bob_Taxi.jpg").exists());
    }

    #[tokio::test]
    async fn test_save_same_name_keeps_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        store.create_folder("receipts").await.unwrap();

        let first = store
            .save("receipts", "2024-05-01_Bob_Taxi.png", "image/png", vec![1, 1])
            .await
            .unwrap();
        let second = store
            .save("receipts", "2024-05-01_Bob_Taxi.png", "image/png", vec![2, 2])
            .await
            .unwrap();
        let third = store
            .save("receipts", "2024-05-01_Bob_Taxi.png", "image/png", vec![3, 3])
            .await
            .unwrap();

        assert_eq!(second.file_name, "2024-05-01_Bob_Taxi.png");
        assert_ne!(first.location, second.location);
        assert_ne!(second.location, third.location);

        let folder = dir.path().join("receipts");
        assert_eq!(std::fs::read(folder.join("2024-05-01_Bob_Taxi.png")).unwrap(), vec![1, 1]);
        assert_eq!(std::fs::read(folder.join("2024-05-01_Bob_Taxi_1.png")).unwrap(), vec![2, 2]);
        assert_eq!(std::fs::read(&third.location).unwrap(), vec![3, 3]);
        assert_eq!(std::fs::read_dir(&folder).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_saves_with_same_name_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        store.create_folder("receipts").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.save("receipts", "same.jpg", "image/jpeg", vec![i; 64]).await
            }));
        }
        let mut contents = Vec::new();
        for handle in handles {
            let blob = handle.await.unwrap().unwrap();
            contents.push(std::fs::read(&blob.location).unwrap()[0]);
        }
        contents.sort();

        assert_eq!(contents, (0..8u8).collect::<Vec<_>>());
        assert_eq!(std::fs::read_dir(dir.path().join("receipts")).unwrap().count(), 8);
    }

    #[tokio::test]
    async fn test_save_missing_folder_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let result = store.save("nowhere", "a.jpg", "image/jpeg", vec![1]).await;

        assert!(matches!(result, Err(StorageError::FolderNotFound(_))));
        assert!(!dir.path().join("nowhere").exists());
    }

    #[tokio::test]
    async fn test_save_rejects_empty_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        store.create_folder("receipts").await.unwrap();

        assert!(matches!(
            store.save("", "a.jpg", "image/jpeg", vec![1]).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.save("receipts", " ", "image/jpeg", vec![1]).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.save("../receipts", "a.jpg", "image/jpeg", vec![1]).await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
