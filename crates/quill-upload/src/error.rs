use quill_core::AppError;
use thiserror::Error;

/// Result type for pipeline operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Why a candidate was rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("file is empty")]
    Empty,

    #[error("file size {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("content type '{content_type}' is not allowed (allowed: {allowed})")]
    ContentType {
        content_type: String,
        allowed: String,
    },

    #[error("invalid file name: {0}")]
    FileName(String),
}

/// Upload pipeline errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Bad input; no network call was made
    #[error("File #{position} ({file_name}) rejected: {reason}")]
    Validation {
        file_name: String,
        position: usize,
        reason: ValidationReason,
    },

    /// Reading the file into memory failed
    #[error("Failed to read file #{position} ({file_name}): {source}")]
    Io {
        file_name: String,
        position: usize,
        #[source]
        source: std::io::Error,
    },

    /// One failed attempt; retried by the single-upload operation
    #[error("Upload attempt {attempt} for {file_name} failed: {message}")]
    TransientUpload {
        file_name: String,
        attempt: u32,
        message: String,
    },

    /// Retries exhausted; fatal for this file
    #[error("Upload of {file_name} failed after {attempts} attempt(s): {message}")]
    Upload {
        file_name: String,
        attempts: u32,
        message: String,
    },

    /// One or more files of a batch failed; the rest were rolled back
    #[error("Batch upload failed ({failed} of {total} files): {first}")]
    AggregateBatch {
        failed: usize,
        total: usize,
        rolled_back: usize,
        rollback_warnings: usize,
        first: Box<UploadError>,
    },
}

impl UploadError {
    /// Name of the file this error is about, if it concerns a single file
    pub fn file_name(&self) -> Option<&str> {
        match self {
            UploadError::Validation { file_name, .. }
            | UploadError::Io { file_name, .. }
            | UploadError::TransientUpload { file_name, .. }
            | UploadError::Upload { file_name, .. } => Some(file_name),
            UploadError::AggregateBatch { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, UploadError::Validation { .. })
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Validation {
                reason: ValidationReason::TooLarge { .. },
                ..
            } => AppError::PayloadTooLarge(err.to_string()),
            UploadError::Validation { .. } => AppError::InvalidInput(err.to_string()),
            UploadError::Io { .. } => AppError::InvalidInput(err.to_string()),
            _ => AppError::Storage(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ErrorMetadata;

    #[test]
    fn test_aggregate_error_displays_first_failure() {
        let err = UploadError::AggregateBatch {
            failed: 1,
            total: 3,
            rolled_back: 2,
            rollback_warnings: 0,
            first: Box::new(UploadError::Upload {
                file_name: "b.png".to_string(),
                attempts: 3,
                message: "image store returned 503".to_string(),
            }),
        };
        let message = err.to_string();
        assert!(message.contains("1 of 3"));
        assert!(message.contains("b.png"));
        assert!(message.contains("503"));
        assert!(err.file_name().is_none());
    }

    #[test]
    fn test_oversize_maps_to_payload_too_large() {
        let err = UploadError::Validation {
            file_name: "big.jpg".to_string(),
            position: 3,
            reason: ValidationReason::TooLarge {
                size: 11,
                max: 10,
            },
        };
        let app: AppError = err.into();
        assert_eq!(app.http_status_code(), 413);
    }

    #[test]
    fn test_content_type_maps_to_invalid_input() {
        let err = UploadError::Validation {
            file_name: "doc.pdf".to_string(),
            position: 1,
            reason: ValidationReason::ContentType {
                content_type: "application/pdf".to_string(),
                allowed: "image/png".to_string(),
            },
        };
        assert!(err.is_validation());
        let app: AppError = err.into();
        assert_eq!(app.http_status_code(), 400);
    }

    #[test]
    fn test_upload_failure_maps_to_storage() {
        let err = UploadError::Upload {
            file_name: "a.png".to_string(),
            attempts: 3,
            message: "timeout".to_string(),
        };
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "STORAGE_ERROR");
        assert!(app.is_recoverable());
    }
}
