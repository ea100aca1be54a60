//! Shared reference validation for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Validate a book, section or folder reference used as one path segment.
pub fn validate_segment(kind: &str, value: &str) -> StorageResult<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "{} is required and must be a non-empty string.",
            kind
        )));
    }

    if value.contains("..") || value.contains('/') || value.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "{} contains invalid characters: {}",
            kind, value
        )));
    }

    Ok(())
}

/// Map a logical file name to a name safe to use inside one directory.
///
/// Separators become `_`; the caller keeps the logical name.
pub fn disk_file_name(file_name: &str) -> StorageResult<String> {
    let name: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    if name.trim().is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidKey(format!(
            "File name is not usable: {:?}",
            file_name
        )));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("Folder ID", "receipts-2024").is_ok());
        assert!(validate_segment("Folder ID", "").is_err());
        assert!(validate_segment("Folder ID", "../etc").is_err());
        assert!(validate_segment("Folder ID", "a/b").is_err());
    }

    #[test]
    fn test_disk_file_name_replaces_separators() {
        assert_eq!(
            disk_file_name("2024/05/01_Bob_Taxi.jpg").unwrap(),
            "2024_05_01_Bob_Taxi.jpg"
        );
        assert!(disk_file_name("..").is_err());
        assert!(disk_file_name("  ").is_err());
    }
}
