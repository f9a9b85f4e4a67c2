//! Bounded-concurrency batch upload
//!
//! Every buffered candidate gets its own task. Tasks are spawned together and
//! each one waits for a permit from a shared semaphore before it touches the
//! network, so at most `max_concurrency` uploads are in flight at any time.
//! The collector waits for every task; nothing short-circuits.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use quill_core::{ImageDescriptor, UploadCandidate};
use quill_storage::ImageStore;
use tokio::sync::Semaphore;

use crate::error::UploadError;
use crate::retry::RetryPolicy;
use crate::single::upload_candidate;
use crate::state::CandidateState;

/// A candidate the store accepted
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    /// 1-based position in the submitted batch
    pub position: usize,
    pub descriptor: ImageDescriptor,
    pub state: CandidateState,
}

/// A candidate that could not be stored
#[derive(Debug)]
pub struct FailedUpload {
    pub file_name: String,
    pub position: usize,
    pub error: UploadError,
}

/// Outcome of one batch before rollback. Order within each list follows
/// completion, not submission.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: Vec<UploadedImage>,
    pub failed: Vec<FailedUpload>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct BatchUploader {
    store: Arc<dyn ImageStore>,
    policy: RetryPolicy,
    max_concurrency: usize,
}

impl BatchUploader {
    pub fn new(store: Arc<dyn ImageStore>, policy: RetryPolicy, max_concurrency: usize) -> Self {
        Self {
            store,
            policy,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn upload_all(&self, candidates: Vec<UploadCandidate>) -> BatchResult {
        let total = candidates.len();
        let start = std::time::Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = FuturesUnordered::new();

        for (index, candidate) in candidates.into_iter().enumerate() {
            let position = index + 1;
            let file_name = candidate.file_name.clone();
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let policy = self.policy;

            let handle = tokio::spawn(async move {
                let mut state = CandidateState::Buffered;
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Err(UploadError::Upload {
                        file_name: candidate.file_name.clone(),
                        attempts: 0,
                        message: "upload limiter closed".to_string(),
                    });
                };

                state.advance(CandidateState::Uploading, &candidate.file_name);
                let result = upload_candidate(store.as_ref(), &policy, &candidate).await;
                match &result {
                    Ok(_) => state.advance(CandidateState::Uploaded, &candidate.file_name),
                    Err(_) => state.advance(CandidateState::UploadFailed, &candidate.file_name),
                }
                result
            });

            tasks.push(async move { (position, file_name, handle.await) });
        }

        let mut result = BatchResult::default();
        while let Some((position, file_name, joined)) = tasks.next().await {
            match joined {
                Ok(Ok(descriptor)) => result.succeeded.push(UploadedImage {
                    file_name,
                    position,
                    descriptor,
                    state: CandidateState::Uploaded,
                }),
                Ok(Err(error)) => result.failed.push(FailedUpload {
                    file_name,
                    position,
                    error,
                }),
                Err(join_error) => {
                    tracing::error!(
                        file_name = %file_name,
                        position = position,
                        error = %join_error,
                        "Upload task panicked"
                    );
                    result.failed.push(FailedUpload {
                        error: UploadError::Upload {
                            file_name: file_name.clone(),
                            attempts: 0,
                            message: format!("upload task failed: {}", join_error),
                        },
                        file_name,
                        position,
                    });
                }
            }
        }

        tracing::info!(
            total = total,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            max_concurrency = self.max_concurrency,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Batch upload finished"
        );

        result
    }
}
