use std::sync::Arc;

use quill_core::AppError;
use quill_upload::{ImageUploadService, IncomingFile};
use uuid::Uuid;

use crate::models::{ContentImage, ImageOwner};
use crate::repository::Repository;

/// Images embedded in posts and comments
#[derive(Clone)]
pub struct ContentImageService {
    images: Arc<dyn Repository<ContentImage>>,
    uploads: ImageUploadService,
}

impl ContentImageService {
    pub fn new(images: Arc<dyn Repository<ContentImage>>, uploads: ImageUploadService) -> Self {
        Self { images, uploads }
    }

    /// Upload `files` and record them against `owner`, all or nothing.
    ///
    /// A failed upload leaves nothing behind (the batch rolls itself back). A
    /// failed insert deletes every uploaded image and any record already added.
    #[tracing::instrument(
        skip(self, owner, files),
        fields(owner_kind = owner.kind(), owner_id = %owner.owner_id(), count = files.len())
    )]
    pub async fn attach_images(
        &self,
        owner: ImageOwner,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<ContentImage>, AppError> {
        let descriptors = self.uploads.upload_batch(files).await?;

        let mut added: Vec<ContentImage> = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            match self.images.add(ContentImage::new(owner, descriptor.clone())).await {
                Ok(image) => added.push(image),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        persisted = added.len(),
                        uploaded = descriptors.len(),
                        "Failed to persist content image, undoing upload"
                    );

                    let public_ids = descriptors.iter().map(|d| d.public_id.clone()).collect();
                    if !self.uploads.delete_batch(public_ids).await {
                        tracing::warn!("Some uploaded images could not be deleted");
                    }

                    for image in &added {
                        if let Err(remove_err) = self.images.remove(image.id).await {
                            tracing::warn!(
                                image_id = %image.id,
                                error = %remove_err,
                                "Failed to remove content image record"
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(attached = added.len(), "Content images attached");
        Ok(added)
    }

    /// Delete the images and, if every deletion succeeded, their records.
    ///
    /// Unknown ids are skipped. Returns the bulk delete result; on `false` all
    /// records are kept so the caller can retry.
    #[tracing::instrument(skip(self, image_ids), fields(count = image_ids.len()))]
    pub async fn remove_images(&self, image_ids: Vec<Uuid>) -> Result<bool, AppError> {
        let mut records = Vec::with_capacity(image_ids.len());
        for id in image_ids {
            match self.images.get(id).await? {
                Some(image) => records.push(image),
                None => tracing::debug!(image_id = %id, "Content image not found, skipping"),
            }
        }

        let public_ids = records.iter().map(|r| r.public_id.clone()).collect();
        let all_deleted = self.uploads.delete_batch(public_ids).await;

        if !all_deleted {
            tracing::warn!(
                images = records.len(),
                "Not every content image was deleted, keeping records"
            );
            return Ok(false);
        }

        for record in &records {
            self.images.remove(record.id).await?;
        }

        tracing::info!(removed = records.len(), "Content images removed");
        Ok(true)
    }
}
