//! Image store abstraction trait
//!
//! This module defines the ImageStore trait that all remote image hosts must implement.

use crate::ImageStoreBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use quill_core::ImageDescriptor;
use thiserror::Error;

/// Image store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid public id: {0}")]
    InvalidKey(String),

    #[error("Unexpected response from image store: {0}")]
    InvalidResponse(String),

    #[error("Image store backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
                | StorageError::InvalidResponse(_)
        )
    }
}

/// Result type for image store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What the store reports for one upload request.
///
/// A response is returned even when the store rejects the upload; callers must
/// check [`UploadResponse::is_success`] before trusting `public_id` and `url`.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: StatusCode,
    pub public_id: String,
    pub url: String,
    /// Error text reported by the store on a non-success status
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn accepted(public_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            public_id: public_id.into(),
            url: url.into(),
            error: None,
        }
    }

    pub fn rejected(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            public_id: String::new(),
            url: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_descriptor(self) -> ImageDescriptor {
        ImageDescriptor::new(self.public_id, self.url)
    }
}

/// What the store reports for one delete request.
#[derive(Debug, Clone)]
pub struct DeleteResponse {
    pub status: StatusCode,
    /// Store-level outcome, `ok` when the image was removed
    pub result: String,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            result: "ok".to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            result: "not found".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success() && self.result.eq_ignore_ascii_case("ok")
    }
}

/// Remote image store abstraction
///
/// The upload pipeline only needs two primitives: store one image and remove one
/// image by its public id. Both report the store's HTTP-style status instead of
/// failing on a rejection, so callers decide what counts as success.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload one image under `upload_key`. Uploading the same key again
    /// replaces the stored image.
    async fn upload(
        &self,
        upload_key: &str,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResponse>;

    /// Delete one image by public id. Deleting an unknown id is not an error.
    async fn delete(&self, public_id: &str) -> StorageResult<DeleteResponse>;

    /// Get the backend type
    fn backend_type(&self) -> ImageStoreBackend;
}
