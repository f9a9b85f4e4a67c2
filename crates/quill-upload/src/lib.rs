//! Quill Upload Library
//!
//! The image upload pipeline shared by every caller that stores images (account
//! avatars, post and comment images):
//!
//! 1. **Buffering**: incoming files are validated and read into memory one at a
//!    time, in order. The first bad file aborts the whole call before any
//!    network I/O.
//! 2. **Upload**: buffered files are uploaded concurrently, at most K at a
//!    time, each with retry and exponential backoff.
//! 3. **Rollback**: if any file could not be stored, every image stored by the
//!    same call is deleted again and a single aggregate error is returned.
//!
//! [`ImageUploadService`] is the entry point; the stages are public so callers
//! with unusual needs can compose them directly.

pub mod batch;
pub mod buffer;
pub mod error;
pub mod retry;
pub mod rollback;
pub mod single;
pub mod state;
pub mod validation;

mod service;

pub use batch::{BatchResult, BatchUploader, FailedUpload, UploadedImage};
pub use buffer::{buffer_files, buffer_one, IncomingFile};
pub use error::{UploadError, UploadResult, ValidationReason};
pub use retry::{AttemptFailure, RetryPolicy};
pub use rollback::{RollbackCoordinator, RollbackReport, RollbackWarning};
pub use service::ImageUploadService;
pub use state::CandidateState;
pub use validation::ImageValidator;
