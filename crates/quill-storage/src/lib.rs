//! Quill Storage Library
//!
//! This crate provides the remote image store abstraction and its implementations:
//! the Cloudinary HTTP client used in production and a local filesystem store for
//! development.
//!
//! # Public ids
//!
//! The caller generates one upload key per file with [`new_upload_key`] and
//! passes it on every attempt, so a retried upload overwrites the same image.
//! Stores derive the public id from the key and never from the caller's file
//! name: `{folder}/{key}` when a folder is configured, `{key}` otherwise. The
//! local store appends the file extension so files stay directly servable.

#[cfg(feature = "store-cloudinary")]
pub mod cloudinary;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "store-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "store-cloudinary")]
pub use cloudinary::CloudinaryStore;
pub use factory::create_image_store;
pub use keys::new_upload_key;
#[cfg(feature = "store-local")]
pub use local::LocalImageStore;
pub use quill_core::ImageStoreBackend;
pub use traits::{DeleteResponse, ImageStore, StorageError, StorageResult, UploadResponse};
