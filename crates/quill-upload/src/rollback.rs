use std::fmt;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use quill_core::ImageDescriptor;
use quill_storage::ImageStore;
use tokio::sync::Semaphore;

use crate::batch::{BatchResult, UploadedImage};
use crate::error::{UploadError, UploadResult};
use crate::single::delete_image;
use crate::state::CandidateState;

/// An image that rollback could not remove. Logged and counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackWarning {
    pub public_id: String,
    pub reason: String,
}

impl fmt::Display for RollbackWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to delete {}: {}", self.public_id, self.reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    pub deleted: usize,
    pub warnings: Vec<RollbackWarning>,
}

/// Turns a [`BatchResult`] into the caller's outcome, deleting stored images
/// when the batch did not succeed in full. Also owns the bounded bulk delete.
#[derive(Clone)]
pub struct RollbackCoordinator {
    store: Arc<dyn ImageStore>,
    max_concurrency: usize,
}

impl RollbackCoordinator {
    pub fn new(store: Arc<dyn ImageStore>, max_concurrency: usize) -> Self {
        Self {
            store,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Descriptors in submission order when every file was stored; otherwise
    /// roll back and return [`UploadError::AggregateBatch`].
    pub async fn finalize(&self, result: BatchResult) -> UploadResult<Vec<ImageDescriptor>> {
        let total = result.total();
        let BatchResult {
            mut succeeded,
            failed,
        } = result;

        let failed_count = failed.len();
        let Some(first) = failed.into_iter().min_by_key(|f| f.position) else {
            succeeded.sort_by_key(|image| image.position);
            return Ok(succeeded.into_iter().map(|image| image.descriptor).collect());
        };

        tracing::warn!(
            failed = failed_count,
            total = total,
            to_roll_back = succeeded.len(),
            first_failure = %first.error,
            "Batch upload incomplete, rolling back"
        );

        let report = self.rollback(&mut succeeded).await;

        Err(UploadError::AggregateBatch {
            failed: failed_count,
            total,
            rolled_back: report.deleted,
            rollback_warnings: report.warnings.len(),
            first: Box::new(first.error),
        })
    }

    /// Delete every image in `images`, marking the removed ones `Deleted`.
    /// Images whose deletion fails stay `Uploaded` and show up as warnings.
    pub async fn rollback(&self, images: &mut [UploadedImage]) -> RollbackReport {
        let ids = images
            .iter()
            .map(|image| image.descriptor.public_id.clone())
            .collect();
        let outcomes = self.delete_all(ids).await;

        let mut report = RollbackReport::default();
        for (index, outcome) in outcomes {
            let image = &mut images[index];
            match outcome {
                Ok(()) => {
                    image.state.advance(CandidateState::Deleted, &image.file_name);
                    report.deleted += 1;
                }
                Err(reason) => {
                    let warning = RollbackWarning {
                        public_id: image.descriptor.public_id.clone(),
                        reason,
                    };
                    tracing::warn!(
                        file_name = %image.file_name,
                        public_id = %warning.public_id,
                        error = %warning.reason,
                        "Rollback deletion failed, image left in store"
                    );
                    report.warnings.push(warning);
                }
            }
        }

        report
    }

    /// Delete every id, at most K at a time. `true` only if all succeeded.
    pub async fn delete_batch(&self, public_ids: Vec<String>) -> bool {
        let total = public_ids.len();
        let outcomes = self.delete_all(public_ids).await;
        let failed = outcomes.iter().filter(|(_, outcome)| outcome.is_err()).count();

        tracing::info!(
            total = total,
            failed = failed,
            "Batch delete finished"
        );

        outcomes.into_iter().all(|(_, outcome)| outcome.is_ok())
    }

    /// Run one delete task per id under the semaphore and wait for all of
    /// them. Results are keyed by the id's index in `public_ids`.
    async fn delete_all(&self, public_ids: Vec<String>) -> Vec<(usize, Result<(), String>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = FuturesUnordered::new();

        for (index, public_id) in public_ids.into_iter().enumerate() {
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Err("delete limiter closed".to_string());
                };
                delete_image(store.as_ref(), &public_id).await.map_err(|reason| {
                    tracing::warn!(public_id = %public_id, error = %reason, "Image delete failed");
                    reason
                })
            });

            tasks.push(async move { (index, handle.await) });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some((index, joined)) = tasks.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => Err(format!("delete task failed: {}", join_error)),
            };
            outcomes.push((index, outcome));
        }
        outcomes
    }
}
