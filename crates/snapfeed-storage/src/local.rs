//! Local disk image store

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{ImageStore, image_extension, validate_filename};
use crate::error::StorageError;

/// Local disk image store
///
/// Stores every upload flat under `<base_path>/<uuid>.<ext>`.
pub struct LocalImageStore {
    base_path: PathBuf,
}

impl LocalImageStore {
    /// Create a new local image store
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path).await?;

        info!("Initialized local image storage at {:?}", base_path);

        Ok(Self { base_path })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, original_name: &str, data: Bytes) -> Result<String, StorageError> {
        if data.is_empty() {
            return Err(StorageError::Empty);
        }
        let ext = image_extension(original_name)?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.base_path.join(&filename);
        debug!("Writing image to {:?}", path);

        // Write atomically using a temp file
        let temp_path = path.with_extension(format!("{}.tmp", ext));
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(filename)
    }

    async fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.path(filename)?;
        debug!("Deleting image {:?}", path);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        validate_filename(filename)?;
        Ok(self.base_path.join(filename))
    }

    fn root(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (LocalImageStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalImageStore::new(dir.path().join("uploads")).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let (store, _dir) = store().await;

        let name = store
            .save("holiday.PNG", Bytes::from_static(b"\x89PNG fake"))
            .await
            .unwrap();
        assert!(name.ends_with(".png"));

        let path = store.path(&name).unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"\x89PNG fake");

        assert!(store.delete(&name).await.unwrap());
        assert!(!path.exists());
        assert!(!store.delete(&name).await.unwrap());
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let (store, _dir) = store().await;

        let a = store.save("a.jpg", Bytes::from_static(b"1")).await.unwrap();
        let b = store.save("a.jpg", Bytes::from_static(b"2")).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_rejects_bad_uploads() {
        let (store, _dir) = store().await;

        assert!(matches!(
            store.save("run.exe", Bytes::from_static(b"MZ")).await,
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.save("a.png", Bytes::new()).await,
            Err(StorageError::Empty)
        ));
        assert!(matches!(
            store.delete("../outside.png").await,
            Err(StorageError::InvalidName(_))
        ));
    }
}
