//! Test helpers: a scripted in-memory image store.
//!
//! Run with `cargo test -p quill-upload`.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use quill_core::{ImageStoreBackend, ImageUploadConfig};
use quill_storage::{DeleteResponse, ImageStore, StorageError, StorageResult, UploadResponse};
use quill_upload::{ImageUploadService, IncomingFile, RetryPolicy};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What the store does with one upload attempt
#[derive(Debug, Clone)]
pub enum Outcome {
    Accept,
    Reject(StatusCode),
    /// Transport-level failure
    Fail,
    /// Store error that no retry can fix
    Misconfigured,
    Panic,
}

/// In-memory [`ImageStore`] with per-file scripted outcomes.
///
/// Each file name has a queue of outcomes consumed one per attempt; once the
/// queue is empty every further attempt uses the fallback (accept by default).
#[derive(Default)]
pub struct MockImageStore {
    scripts: Mutex<HashMap<String, (VecDeque<Outcome>, Option<Outcome>)>>,
    stored: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    deleted_ids: Mutex<Vec<String>>,
    attempt_times: Mutex<Vec<(String, Instant)>>,
    upload_keys: Mutex<Vec<(String, String)>>,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
    uploads_in_flight: AtomicUsize,
    max_uploads_in_flight: AtomicUsize,
    deletes_in_flight: AtomicUsize,
    max_deletes_in_flight: AtomicUsize,
    delay: Duration,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload and delete call takes at least `delay`
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Queue outcomes for the next attempts on `file_name`
    pub fn script(&self, file_name: &str, outcomes: Vec<Outcome>) {
        let mut scripts = self.scripts.lock().unwrap();
        let entry = scripts.entry(file_name.to_string()).or_default();
        entry.0.extend(outcomes);
    }

    /// Use `outcome` for every attempt on `file_name`
    pub fn always(&self, file_name: &str, outcome: Outcome) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(file_name.to_string()).or_default().1 = Some(outcome);
    }

    /// Deleting `public_id` will fail with a transport error
    pub fn fail_delete(&self, public_id: &str) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(public_id.to_string());
    }

    pub fn public_id_for(file_name: &str) -> String {
        format!("mock/{}", file_name)
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn max_uploads_in_flight(&self) -> usize {
        self.max_uploads_in_flight.load(Ordering::SeqCst)
    }

    pub fn max_deletes_in_flight(&self) -> usize {
        self.max_deletes_in_flight.load(Ordering::SeqCst)
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        let mut ids = self.deleted_ids.lock().unwrap().clone();
        ids.sort();
        ids
    }

    pub fn stored_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.stored.lock().unwrap().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn attempt_times(&self, file_name: &str) -> Vec<Instant> {
        self.attempt_times
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == file_name)
            .map(|(_, at)| *at)
            .collect()
    }

    /// Upload keys sent for `file_name`, one per attempt
    pub fn upload_keys(&self, file_name: &str) -> Vec<String> {
        self.upload_keys
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == file_name)
            .map(|(_, key)| key.clone())
            .collect()
    }

    fn next_outcome(&self, file_name: &str) -> Outcome {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(file_name) {
            Some((queue, fallback)) => queue
                .pop_front()
                .or_else(|| fallback.clone())
                .unwrap_or(Outcome::Accept),
            None => Outcome::Accept,
        }
    }

    fn enter(current: &AtomicUsize, max: &AtomicUsize) {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(
        &self,
        upload_key: &str,
        file_name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<UploadResponse> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.upload_keys
            .lock()
            .unwrap()
            .push((file_name.to_string(), upload_key.to_string()));
        self.attempt_times
            .lock()
            .unwrap()
            .push((file_name.to_string(), Instant::now()));
        assert!(!data.is_empty(), "upload received an empty buffer");

        Self::enter(&self.uploads_in_flight, &self.max_uploads_in_flight);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.uploads_in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.next_outcome(file_name) {
            Outcome::Accept => {
                let public_id = Self::public_id_for(file_name);
                self.stored.lock().unwrap().insert(public_id.clone());
                let url = format!("https://cdn.example.com/{}", public_id);
                Ok(UploadResponse::accepted(public_id, url))
            }
            Outcome::Reject(status) => Ok(UploadResponse::rejected(status, "scripted rejection")),
            Outcome::Fail => Err(StorageError::UploadFailed("connection reset".to_string())),
            Outcome::Misconfigured => Err(StorageError::ConfigError("missing api key".to_string())),
            Outcome::Panic => panic!("scripted panic for {}", file_name),
        }
    }

    async fn delete(&self, public_id: &str) -> StorageResult<DeleteResponse> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        Self::enter(&self.deletes_in_flight, &self.max_deletes_in_flight);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.deletes_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_deletes.lock().unwrap().contains(public_id) {
            return Err(StorageError::DeleteFailed("connection reset".to_string()));
        }

        if self.stored.lock().unwrap().remove(public_id) {
            self.deleted_ids.lock().unwrap().push(public_id.to_string());
            Ok(DeleteResponse::ok())
        } else {
            Ok(DeleteResponse::not_found())
        }
    }

    fn backend_type(&self) -> ImageStoreBackend {
        ImageStoreBackend::Local
    }
}

/// Upload config with a tiny size limit so tests stay cheap
pub fn test_config(max_file_size_bytes: usize) -> ImageUploadConfig {
    ImageUploadConfig {
        max_file_size_bytes,
        ..ImageUploadConfig::default()
    }
}

/// Service over `store` with the default limits but fast retries
pub fn fast_service(store: &Arc<MockImageStore>, max_file_size_bytes: usize) -> ImageUploadService {
    ImageUploadService::new(store.clone(), &test_config(max_file_size_bytes)).with_retry_policy(
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2,
        },
    )
}

pub fn png(file_name: &str, size: usize) -> IncomingFile {
    IncomingFile::from_bytes(file_name, "image/png", vec![0x89u8; size])
}
