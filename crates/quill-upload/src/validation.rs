//! Pre-flight checks for upload candidates

use quill_core::{ImageUploadConfig, UploadCandidate};
use validator::Validate;

use crate::error::ValidationReason;

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Rejects malformed, oversized or disallowed candidates. Pure; performs no I/O.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    max_file_size_bytes: u64,
    allowed_content_types: Vec<String>,
}

impl ImageValidator {
    pub fn new(config: &ImageUploadConfig) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes as u64,
            allowed_content_types: config
                .allowed_content_types
                .iter()
                .map(|ct| normalize_mime_type(ct))
                .collect(),
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    /// Checks that need nothing but what the caller declared: content type and,
    /// when known, the size. Lets the buffering stage refuse a file before
    /// reading it.
    pub fn check_declared(
        &self,
        content_type: &str,
        size_hint: Option<u64>,
    ) -> Result<(), ValidationReason> {
        if let Some(size) = size_hint {
            self.check_size(size)?;
        }
        self.check_content_type(content_type)
    }

    /// Full check of a buffered candidate
    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), ValidationReason> {
        candidate
            .validate()
            .map_err(|e| ValidationReason::FileName(e.to_string()))?;

        if candidate.is_empty() || candidate.size_bytes == 0 {
            return Err(ValidationReason::Empty);
        }

        self.check_size(candidate.size_bytes)?;
        self.check_content_type(&candidate.declared_content_type)
    }

    fn check_size(&self, size: u64) -> Result<(), ValidationReason> {
        if size > self.max_file_size_bytes {
            return Err(ValidationReason::TooLarge {
                size,
                max: self.max_file_size_bytes,
            });
        }
        Ok(())
    }

    fn check_content_type(&self, content_type: &str) -> Result<(), ValidationReason> {
        let normalized = normalize_mime_type(content_type);
        if !self.allowed_content_types.iter().any(|ct| *ct == normalized) {
            return Err(ValidationReason::ContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.join(", "),
            });
        }
        Ok(())
    }
}
