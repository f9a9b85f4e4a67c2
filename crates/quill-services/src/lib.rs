//! Quill Services Layer
//!
//! Callers of the upload pipeline: account avatars and images embedded in
//! posts and comments. Each service pairs an [`ImageUploadService`] with a
//! [`Repository`] and keeps the two consistent when either side fails.
//!
//! [`ImageUploadService`]: quill_upload::ImageUploadService

pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use models::{Account, ContentImage, ImageOwner};
pub use repository::{Entity, Repository};
pub use services::{AvatarService, ContentImageService};
