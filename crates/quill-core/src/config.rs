//! Configuration module
//!
//! Settings for the image store backends and the upload pipeline, loaded from
//! the environment (and an optional `.env` file).

use std::env;

use crate::constants::{
    DEFAULT_ALLOWED_IMAGE_CONTENT_TYPES, DEFAULT_MAX_CONCURRENT_UPLOADS, DEFAULT_MAX_IMAGE_SIZE_MB,
    DEFAULT_UPLOAD_MAX_ATTEMPTS, DEFAULT_UPLOAD_RETRY_BASE_DELAY_MS,
};
use crate::storage_types::ImageStoreBackend;

const IMAGE_STORE_TIMEOUT_SECS: u64 = 30;
const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

/// Limits and retry policy applied by the upload pipeline
#[derive(Clone, Debug)]
pub struct ImageUploadConfig {
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub max_concurrent_uploads: usize,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ImageUploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_IMAGE_SIZE_MB * 1024 * 1024,
            allowed_content_types: DEFAULT_ALLOWED_IMAGE_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            max_attempts: DEFAULT_UPLOAD_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_UPLOAD_RETRY_BASE_DELAY_MS,
        }
    }
}

/// Cloudinary account settings
#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Overridable for tests and regional endpoints
    pub api_base: String,
    pub folder: Option<String>,
    pub timeout_secs: u64,
}

/// Filesystem store settings (development)
#[derive(Clone, Debug)]
pub struct LocalStoreConfig {
    pub base_path: String,
    pub base_url: String,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub image_store_backend: ImageStoreBackend,
    pub cloudinary: Option<CloudinaryConfig>,
    pub local: Option<LocalStoreConfig>,
    pub upload: ImageUploadConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let image_store_backend = lookup("IMAGE_STORE_BACKEND")
            .unwrap_or_else(|| "cloudinary".to_string())
            .parse::<ImageStoreBackend>()?;

        let cloudinary = match (
            lookup("CLOUDINARY_CLOUD_NAME"),
            lookup("CLOUDINARY_API_KEY"),
            lookup("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                api_base: lookup("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| CLOUDINARY_API_BASE.to_string()),
                folder: lookup("CLOUDINARY_FOLDER").filter(|f| !f.trim().is_empty()),
                timeout_secs: lookup("IMAGE_STORE_TIMEOUT_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(IMAGE_STORE_TIMEOUT_SECS),
            }),
            _ => None,
        };

        let local = match (lookup("LOCAL_STORAGE_PATH"), lookup("LOCAL_STORAGE_BASE_URL")) {
            (Some(base_path), Some(base_url)) => Some(LocalStoreConfig {
                base_path,
                base_url,
            }),
            _ => None,
        };

        let defaults = ImageUploadConfig::default();

        let max_image_size_mb = lookup("MAX_IMAGE_SIZE_MB")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_IMAGE_SIZE_MB);

        let allowed_content_types = lookup("ALLOWED_IMAGE_CONTENT_TYPES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_content_types);

        let upload = ImageUploadConfig {
            max_file_size_bytes: max_image_size_mb * 1024 * 1024,
            allowed_content_types,
            max_concurrent_uploads: lookup("MAX_CONCURRENT_UPLOADS")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.max_concurrent_uploads),
            max_attempts: lookup("UPLOAD_MAX_ATTEMPTS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.max_attempts),
            retry_base_delay_ms: lookup("UPLOAD_RETRY_BASE_DELAY_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.retry_base_delay_ms),
        };

        Ok(Config {
            image_store_backend,
            cloudinary,
            local,
            upload,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.image_store_backend {
            ImageStoreBackend::Cloudinary if self.cloudinary.is_none() => {
                return Err(anyhow::anyhow!(
                    "IMAGE_STORE_BACKEND=cloudinary requires CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET"
                ));
            }
            ImageStoreBackend::Local if self.local.is_none() => {
                return Err(anyhow::anyhow!(
                    "IMAGE_STORE_BACKEND=local requires LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL"
                ));
            }
            _ => {}
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be greater than 0"));
        }

        if self.upload.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_IMAGE_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.upload.max_concurrent_uploads == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_UPLOADS must be greater than 0"));
        }

        if self.upload.max_attempts == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_ATTEMPTS must be greater than 0"));
        }

        Ok(())
    }

    pub fn upload(&self) -> &ImageUploadConfig {
        &self.upload
    }

    pub fn max_concurrent_uploads(&self) -> usize {
        self.upload.max_concurrent_uploads
    }
}
