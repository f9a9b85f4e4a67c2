//! Sequential buffering stage
//!
//! Request bodies can only be read by one reader, front to back, so incoming
//! files are drained one at a time, in order, into owned buffers that the
//! upload stage can then share out to concurrent tasks.

use std::io::Cursor;
use std::pin::Pin;

use bytes::Bytes;
use quill_core::UploadCandidate;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{UploadError, UploadResult};
use crate::validation::ImageValidator;

/// A file as handed over by the caller, not yet read
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    /// Size announced by the caller (e.g. a Content-Length), if any
    pub size_hint: Option<u64>,
    reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
}

impl IncomingFile {
    pub fn new<R>(file_name: impl Into<String>, content_type: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_hint: None,
            reader: Box::pin(reader),
        }
    }

    /// Wrap content that is already in memory (e.g. a multipart field)
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self::new(file_name, content_type, Cursor::new(data)).with_size_hint(size)
    }

    pub fn with_size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }
}

impl std::fmt::Debug for IncomingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

/// Read and validate one file. `position` is 1-based and only used for errors.
pub async fn buffer_one(
    validator: &ImageValidator,
    file: IncomingFile,
    position: usize,
) -> UploadResult<UploadCandidate> {
    let IncomingFile {
        file_name,
        content_type,
        size_hint,
        reader,
    } = file;

    let reject = |reason| UploadError::Validation {
        file_name: file_name.clone(),
        position,
        reason,
    };

    validator
        .check_declared(&content_type, size_hint)
        .map_err(reject)?;

    // One byte past the limit is enough to know the file is too large.
    let limit = validator.max_file_size_bytes().saturating_add(1);
    let capacity = size_hint.unwrap_or(0).min(limit) as usize;
    let mut buf = Vec::with_capacity(capacity);

    reader
        .take(limit)
        .read_to_end(&mut buf)
        .await
        .map_err(|source| UploadError::Io {
            file_name: file_name.clone(),
            position,
            source,
        })?;

    let candidate = UploadCandidate::new(file_name.clone(), content_type, buf);
    validator.validate(&candidate).map_err(reject)?;

    Ok(candidate)
}

/// Buffer every file in order. The first failure drops everything buffered so
/// far and is returned; no partial list ever leaves this function.
pub async fn buffer_files(
    validator: &ImageValidator,
    files: Vec<IncomingFile>,
) -> UploadResult<Vec<UploadCandidate>> {
    let total = files.len();
    let mut candidates = Vec::with_capacity(total);

    for (index, file) in files.into_iter().enumerate() {
        match buffer_one(validator, file, index + 1).await {
            Ok(candidate) => {
                tracing::debug!(
                    file_name = %candidate.file_name,
                    position = index + 1,
                    size_bytes = candidate.size_bytes,
                    "Buffered upload candidate"
                );
                candidates.push(candidate);
            }
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    released = candidates.len(),
                    total = total,
                    "Buffering aborted, releasing buffered files"
                );
                return Err(e);
            }
        }
    }

    Ok(candidates)
}
