use crate::keys::validate_segment;
use crate::traits::{Row, StorageError, StorageResult, TableStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const SECTION_EXTENSION: &str = "jsonl";

/// Local filesystem table store
///
/// Layout: `{base_path}/{book_ref}/{section}.jsonl`, one JSON array per line.
/// Appends to the same section are serialized through a per-section lock.
#[derive(Debug)]
pub struct LocalTableStore {
    base_path: PathBuf,
    append_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl LocalTableStore {
    /// Create a new LocalTableStore instance rooted at `base_path`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create table storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalTableStore {
            base_path,
            append_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Create (or replace) a section with the given rows, creating the book if needed.
    pub async fn write_section(&self, book_ref: &str, section: &str, rows: &[Row]) -> StorageResult<()> {
        validate_segment("Book ID", book_ref)?;
        validate_segment("Section name", section)?;

        let book = self.base_path.join(book_ref);
        fs::create_dir_all(&book).await?;

        let mut contents = String::new();
        for row in rows {
            contents.push_str(&encode_row(row)?);
            contents.push('\n');
        }
        fs::write(section_path(&book, section), contents).await?;
        Ok(())
    }

    fn book_path(&self, book_ref: &str) -> StorageResult<PathBuf> {
        validate_segment("Book ID", book_ref)?;
        Ok(self.base_path.join(book_ref))
    }

    fn lock_for(&self, path: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .append_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    async fn ensure_book(&self, book_ref: &str) -> StorageResult<PathBuf> {
        let book = self.book_path(book_ref)?;
        let is_dir = fs::metadata(&book).await.map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            return Err(StorageError::BookNotFound(format!(
                "Book \"{}\" not found or inaccessible.",
                book_ref
            )));
        }
        Ok(book)
    }

    async fn existing_section(&self, book_ref: &str, section: &str) -> StorageResult<Option<PathBuf>> {
        let book = self.ensure_book(book_ref).await?;
        validate_segment("Section name", section)?;
        let path = section_path(&book, section);

        if fs::try_exists(&path).await? {
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

fn section_path(book: &Path, section: &str) -> PathBuf {
    book.join(format!("{}.{}", section, SECTION_EXTENSION))
}

fn encode_row<T: serde::Serialize + ?Sized>(row: &T) -> StorageResult<String> {
    serde_json::to_string(row).map_err(|e| StorageError::AppendFailed(e.to_string()))
}

#[async_trait]
impl TableStore for LocalTableStore {
    async fn read_section(&self, book_ref: &str, section: &str) -> StorageResult<Option<Vec<Row>>> {
        let book = self.ensure_book(book_ref).await?;
        validate_segment("Section name", section)?;
        let path = section_path(&book, section);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        let mut rows = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<Value> = serde_json::from_str(line).map_err(|e| {
                StorageError::Malformed(format!(
                    "{}/{} line {}: {}",
                    book_ref,
                    section,
                    line_no + 1,
                    e
                ))
            })?;
            rows.push(row);
        }

        tracing::debug!(book = %book_ref, section = %section, rows = rows.len(), "Section read");
        Ok(Some(rows))
    }

    async fn has_section(&self, book_ref: &str, section: &str) -> StorageResult<bool> {
        Ok(self.existing_section(book_ref, section).await?.is_some())
    }

    async fn append_row(&self, book_ref: &str, section: &str, row: &[String]) -> StorageResult<()> {
        let path = self
            .existing_section(book_ref, section)
            .await?
            .ok_or_else(|| StorageError::SectionNotFound {
                book: book_ref.to_string(),
                section: section.to_string(),
            })?;

        let mut line = encode_row(row)?;
        line.push('\n');

        let lock = self.lock_for(&path);
        let _guard = lock.lock().await;

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::AppendFailed(format!("Failed to open {}: {}", path.display(), e))
            })?;
        file.write_all(line.as_bytes()).await.map_err(|e| {
            StorageError::AppendFailed(format!("Failed to append to {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::AppendFailed(format!("Failed to sync {}: {}", path.display(), e))
        })?;

        tracing::info!(book = %book_ref, section = %section, cells = row.len(), "Row appended");
        Ok(())
    }
}
