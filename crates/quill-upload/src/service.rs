//! Image upload service
//!
//! Ties the stages together: buffer → validate → upload (bounded, retried) →
//! finalize or roll back.

use std::sync::Arc;

use quill_core::{ImageDescriptor, ImageUploadConfig};
use quill_storage::ImageStore;

use crate::batch::BatchUploader;
use crate::buffer::{buffer_files, buffer_one, IncomingFile};
use crate::error::UploadResult;
use crate::retry::RetryPolicy;
use crate::rollback::RollbackCoordinator;
use crate::single::{delete_image, upload_candidate};
use crate::validation::ImageValidator;

/// Image upload service
///
/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct ImageUploadService {
    store: Arc<dyn ImageStore>,
    validator: ImageValidator,
    policy: RetryPolicy,
    max_concurrency: usize,
}

impl ImageUploadService {
    pub fn new(store: Arc<dyn ImageStore>, config: &ImageUploadConfig) -> Self {
        Self {
            store,
            validator: ImageValidator::new(config),
            policy: RetryPolicy::from_config(config),
            max_concurrency: config.max_concurrent_uploads.max(1),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Validate, buffer and upload one file
    pub async fn upload_single(&self, file: IncomingFile) -> UploadResult<ImageDescriptor> {
        let candidate = buffer_one(&self.validator, file, 1).await?;
        upload_candidate(self.store.as_ref(), &self.policy, &candidate).await
    }

    /// Upload every file or none of them.
    ///
    /// Files are buffered in order first; a bad file fails the call before any
    /// upload starts. If any upload fails after retries, images already stored
    /// by this call are deleted and [`crate::UploadError::AggregateBatch`] is
    /// returned. On success the descriptors follow the input order.
    ///
    /// Dropping the returned future after uploads have started skips the
    /// rollback; images stored by then stay in the store.
    pub async fn upload_batch(&self, files: Vec<IncomingFile>) -> UploadResult<Vec<ImageDescriptor>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = buffer_files(&self.validator, files).await?;

        let uploader = BatchUploader::new(Arc::clone(&self.store), self.policy, self.max_concurrency);
        let result = uploader.upload_all(candidates).await;

        self.coordinator().finalize(result).await
    }

    /// Delete one image; `false` if the store did not confirm the deletion
    pub async fn delete_single(&self, public_id: &str) -> bool {
        match delete_image(self.store.as_ref(), public_id).await {
            Ok(()) => true,
            Err(reason) => {
                tracing::warn!(public_id = %public_id, error = %reason, "Image delete failed");
                false
            }
        }
    }

    /// Delete every id; `true` only if all deletions succeeded
    pub async fn delete_batch(&self, public_ids: Vec<String>) -> bool {
        self.coordinator().delete_batch(public_ids).await
    }

    fn coordinator(&self) -> RollbackCoordinator {
        RollbackCoordinator::new(Arc::clone(&self.store), self.max_concurrency)
    }
}
