//! Quill Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by the image store backends, the upload pipeline and its callers.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{CloudinaryConfig, Config, ImageUploadConfig, LocalStoreConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ImageDescriptor, UploadCandidate};
pub use storage_types::ImageStoreBackend;
