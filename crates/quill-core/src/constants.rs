//! Pipeline defaults.

/// Largest accepted image, in MiB. Overridden by `MAX_IMAGE_SIZE_MB`.
pub const DEFAULT_MAX_IMAGE_SIZE_MB: usize = 10;

/// Content types accepted by default.
pub const DEFAULT_ALLOWED_IMAGE_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Upper bound on simultaneous uploads (and, separately, deletions) within one batch.
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 5;

/// Attempts per file before an upload is considered failed.
pub const DEFAULT_UPLOAD_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay; doubles on every further retry.
pub const DEFAULT_UPLOAD_RETRY_BASE_DELAY_MS: u64 = 200;
