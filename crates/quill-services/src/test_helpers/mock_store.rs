//! Mock image store for testing

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use quill_core::ImageStoreBackend;
use quill_storage::{DeleteResponse, ImageStore, StorageResult, UploadResponse};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory store; public ids are `img-{n}` in upload order
#[derive(Default)]
pub struct MockImageStore {
    stored: Mutex<HashSet<String>>,
    rejected_files: Mutex<HashSet<String>>,
    deleted: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an image as if it had been uploaded earlier
    pub fn seed(&self, public_id: &str) {
        self.stored.lock().unwrap().insert(public_id.to_string());
    }

    /// Uploads of `file_name` are rejected with 400
    pub fn reject(&self, file_name: &str) {
        self.rejected_files
            .lock()
            .unwrap()
            .insert(file_name.to_string());
    }

    pub fn contains(&self, public_id: &str) -> bool {
        self.stored.lock().unwrap().contains(public_id)
    }

    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<String> {
        let mut ids = self.deleted.lock().unwrap().clone();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(
        &self,
        _upload_key: &str,
        file_name: &str,
        _content_type: &str,
        _data: Bytes,
    ) -> StorageResult<UploadResponse> {
        if self.rejected_files.lock().unwrap().contains(file_name) {
            return Ok(UploadResponse::rejected(
                StatusCode::BAD_REQUEST,
                "Invalid image file",
            ));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("img-{}", n);
        self.stored.lock().unwrap().insert(public_id.clone());
        let url = format!("https://cdn.example.com/{}", public_id);
        Ok(UploadResponse::accepted(public_id, url))
    }

    async fn delete(&self, public_id: &str) -> StorageResult<DeleteResponse> {
        if self.stored.lock().unwrap().remove(public_id) {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(DeleteResponse::ok())
        } else {
            Ok(DeleteResponse::not_found())
        }
    }

    fn backend_type(&self) -> ImageStoreBackend {
        ImageStoreBackend::Local
    }
}
