//! Test helpers for service unit tests
//!
//! In-memory repositories and image store, so the services can be exercised
//! without a database or network.

pub mod mock_repositories;
pub mod mock_store;

pub use mock_repositories::MockRepository;
pub use mock_store::MockImageStore;

use bytes::Bytes;
use quill_core::ImageUploadConfig;
use quill_upload::{ImageUploadService, IncomingFile, RetryPolicy};
use std::sync::Arc;

/// Upload service over `store` that never sleeps between attempts
pub fn upload_service(store: &Arc<MockImageStore>) -> ImageUploadService {
    ImageUploadService::new(store.clone(), &ImageUploadConfig::default())
        .with_retry_policy(RetryPolicy::no_retry())
}

pub fn png(file_name: &str) -> IncomingFile {
    IncomingFile::from_bytes(file_name, "image/png", Bytes::from_static(b"\x89PNG\r\n"))
}
