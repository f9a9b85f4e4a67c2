use crate::keys::extension_for;
use crate::traits::{DeleteResponse, ImageStore, StorageError, StorageResult, UploadResponse};
use crate::ImageStoreBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem image store
///
/// Stands in for the remote host during development: files are written below
/// `base_path` and served by whatever exposes that directory at `base_url`.
#[derive(Clone)]
pub struct LocalImageStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    /// Create a new LocalImageStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for image files (e.g., "/var/lib/quill/images")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/images")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalImageStore {
            base_path,
            base_url,
        })
    }

    /// Convert a public id to a filesystem path, rejecting traversal attempts
    fn key_to_path(&self, public_id: &str) -> StorageResult<PathBuf> {
        if public_id.is_empty() || public_id.contains("..") || public_id.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Public id contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(public_id);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Public id resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn generate_url(&self, public_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), public_id)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(
        &self,
        upload_key: &str,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResponse> {
        let public_id = format!("{}.{}", upload_key, extension_for(content_type));
        let path = self.key_to_path(&public_id)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&public_id);

        tracing::info!(
            path = %path.display(),
            file_name = %file_name,
            public_id = %public_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local image store upload successful"
        );

        Ok(UploadResponse::accepted(public_id, url))
    }

    async fn delete(&self, public_id: &str) -> StorageResult<DeleteResponse> {
        let path = self.key_to_path(public_id)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await? {
            tracing::debug!(public_id = %public_id, "Local image store delete: not found");
            return Ok(DeleteResponse::not_found());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            public_id = %public_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local image store delete successful"
        );

        Ok(DeleteResponse::ok())
    }

    fn backend_type(&self) -> ImageStoreBackend {
        ImageStoreBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store(dir: &Path) -> LocalImageStore {
        LocalImageStore::new(dir, "http://localhost:3000/images".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_store_upload_writes_file() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let response = store
            .upload("key-1", "cat.png", "image/png", Bytes::from_static(b"\x89PNG data"))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.public_id, "key-1.png");
        assert!(!response.public_id.contains("cat"));
        assert_eq!(
            response.url,
            format!("http://localhost:3000/images/{}", response.public_id)
        );

        let written = fs::read(dir.path().join(&response.public_id)).await.unwrap();
        assert_eq!(written, b"\x89PNG data");
    }

    #[tokio::test]
    async fn test_local_store_delete_then_delete_again() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let response = store
            .upload("key-2", "dog.jpg", "image/jpeg", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();

        let first = store.delete(&response.public_id).await.unwrap();
        assert!(first.is_success());
        assert!(!dir.path().join(&response.public_id).exists());

        let second = store.delete(&response.public_id).await.unwrap();
        assert!(!second.is_success());
        assert_eq!(second.status, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_same_upload_key_overwrites() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let first = store
            .upload("key-3", "a.png", "image/png", Bytes::from_static(b"first"))
            .await
            .unwrap();
        let second = store
            .upload("key-3", "a.png", "image/png", Bytes::from_static(b"second"))
            .await
            .unwrap();

        assert_eq!(first.public_id, second.public_id);
        let written = fs::read(dir.path().join(&second.public_id)).await.unwrap();
        assert_eq!(written, b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_delete_surfaces_io_errors() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;
        fs::write(dir.path().join("plain.png"), b"png").await.unwrap();

        // A regular file used as a directory is an I/O error, not a missing image
        let result = store.delete("plain.png/inner.png").await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = store(dir.path()).await;

        let result = store.delete("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = store.delete("").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_backend_type() {
        let dir = tempdir().unwrap();
        assert_eq!(store(dir.path()).await.backend_type(), ImageStoreBackend::Local);
    }
}
