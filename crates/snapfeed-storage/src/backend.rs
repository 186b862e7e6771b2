//! Image store trait

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Image extensions accepted for upload
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Storage backend for post images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an upload and return the stored filename
    async fn save(&self, original_name: &str, data: Bytes) -> Result<String, StorageError>;

    /// Remove a stored image; `Ok(false)` when it was already gone
    async fn delete(&self, filename: &str) -> Result<bool, StorageError>;

    /// Resolve a stored filename to its location
    fn path(&self, filename: &str) -> Result<PathBuf, StorageError>;

    /// Directory images are served from
    fn root(&self) -> &Path;
}

/// Lower-cased extension of an upload name, if it is an accepted image type
pub fn image_extension(original_name: &str) -> Result<String, StorageError> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| StorageError::UnsupportedType(original_name.to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedType(original_name.to_string()))
    }
}

/// Reject stored names that could escape the image directory
pub fn validate_filename(filename: &str) -> Result<(), StorageError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.starts_with('.')
    {
        return Err(StorageError::InvalidName(filename.to_string()));
    }
    Ok(())
}
