#[cfg(feature = "store-cloudinary")]
use crate::CloudinaryStore;
#[cfg(feature = "store-local")]
use crate::LocalImageStore;
use crate::{ImageStore, ImageStoreBackend, StorageError, StorageResult};
use quill_core::Config;
use std::sync::Arc;

/// Create an image store based on configuration
pub async fn create_image_store(config: &Config) -> StorageResult<Arc<dyn ImageStore>> {
    match config.image_store_backend {
        #[cfg(feature = "store-cloudinary")]
        ImageStoreBackend::Cloudinary => {
            let cloudinary = config.cloudinary.as_ref().ok_or_else(|| {
                StorageError::ConfigError(
                    "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be configured"
                        .to_string(),
                )
            })?;

            let store = CloudinaryStore::new(cloudinary)?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-cloudinary"))]
        ImageStoreBackend::Cloudinary => Err(StorageError::ConfigError(
            "Cloudinary image store not available (store-cloudinary feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "store-local")]
        ImageStoreBackend::Local => {
            let local = config.local.as_ref().ok_or_else(|| {
                StorageError::ConfigError(
                    "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be configured".to_string(),
                )
            })?;

            let store = LocalImageStore::new(&local.base_path, local.base_url.clone()).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-local"))]
        ImageStoreBackend::Local => Err(StorageError::ConfigError(
            "Local image store not available (store-local feature not enabled)".to_string(),
        )),
    }
}
