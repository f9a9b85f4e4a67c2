//! Single-file upload and delete primitives

use quill_core::{ImageDescriptor, UploadCandidate};
use quill_storage::{new_upload_key, ImageStore};

use crate::error::UploadResult;
use crate::retry::{retry_with_backoff, AttemptFailure, RetryPolicy};

/// Upload one buffered candidate, retrying per `policy`.
///
/// Every attempt sends the full content from offset 0 under the same upload
/// key, so a retry replaces whatever an earlier attempt may have stored. Both a
/// store error and a non-success status count as a failed attempt; store
/// errors that are not transient end the retries early.
pub async fn upload_candidate(
    store: &dyn ImageStore,
    policy: &RetryPolicy,
    candidate: &UploadCandidate,
) -> UploadResult<ImageDescriptor> {
    let start = std::time::Instant::now();
    let upload_key = new_upload_key();
    let upload_key = upload_key.as_str();

    let descriptor = retry_with_backoff(policy, &candidate.file_name, |attempt| {
        attempt_upload(store, upload_key, candidate, attempt)
    })
    .await?;

    tracing::info!(
        file_name = %candidate.file_name,
        public_id = %descriptor.public_id,
        size_bytes = candidate.size_bytes,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Image uploaded"
    );

    Ok(descriptor)
}

async fn attempt_upload(
    store: &dyn ImageStore,
    upload_key: &str,
    candidate: &UploadCandidate,
    attempt: u32,
) -> Result<ImageDescriptor, AttemptFailure> {
    let data = candidate.rewind();
    tracing::debug!(
        file_name = %candidate.file_name,
        upload_key = %upload_key,
        attempt = attempt,
        size_bytes = data.len(),
        "Uploading image"
    );

    let response = store
        .upload(
            upload_key,
            &candidate.file_name,
            &candidate.declared_content_type,
            data,
        )
        .await
        .map_err(|e| AttemptFailure {
            message: e.to_string(),
            retryable: e.is_transient(),
        })?;

    if !response.is_success() {
        return Err(AttemptFailure::retryable(match response.error {
            Some(error) => format!("image store returned {}: {}", response.status, error),
            None => format!("image store returned {}", response.status),
        }));
    }
    Ok(response.into_descriptor())
}

/// Delete one image. `Err` carries the reason the store did not report `ok`.
pub async fn delete_image(store: &dyn ImageStore, public_id: &str) -> Result<(), String> {
    match store.delete(public_id).await {
        Ok(response) if response.is_success() => {
            tracing::info!(public_id = %public_id, "Image deleted");
            Ok(())
        }
        Ok(response) => Err(format!(
            "image store returned {} ({})",
            response.status, response.result
        )),
        Err(e) => Err(e.to_string()),
    }
}
