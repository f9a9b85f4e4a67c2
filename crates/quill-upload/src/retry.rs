use std::future::Future;
use std::time::Duration;

use quill_core::constants::{DEFAULT_UPLOAD_MAX_ATTEMPTS, DEFAULT_UPLOAD_RETRY_BASE_DELAY_MS};
use quill_core::ImageUploadConfig;

use crate::error::{UploadError, UploadResult};

/// Attempt budget and exponential backoff for one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait after the first failed attempt
    pub base_delay: Duration,
    /// Factor applied to the wait after every further failure
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_UPLOAD_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_UPLOAD_RETRY_BASE_DELAY_MS),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ImageUploadConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            ..Self::default()
        }
    }

    /// Policy that tries once and never sleeps
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Wait before the next attempt after `attempt` (1-based) failed, or `None`
    /// when that was the last one.
    pub fn delay_after_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        Some(self.base_delay.saturating_mul(factor))
    }
}

/// Why one attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub message: String,
    /// `false` when repeating the request cannot succeed
    pub retryable: bool,
}

impl AttemptFailure {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the policy's attempts are
/// used up.
///
/// `op` receives the 1-based attempt number. Every retried failure is logged as
/// a [`UploadError::TransientUpload`]; the last failure is returned as
/// [`UploadError::Upload`].
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    file_name: &str,
    mut op: F,
) -> UploadResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptFailure>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let failure = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };
        let message = failure.message;

        if !failure.retryable {
            tracing::error!(
                file_name = %file_name,
                attempts = attempt,
                error = %message,
                "Upload failed, error is not retryable"
            );
            return Err(UploadError::Upload {
                file_name: file_name.to_string(),
                attempts: attempt,
                message,
            });
        }

        let delay = if attempt < max_attempts {
            policy.delay_after_attempt(attempt)
        } else {
            None
        };

        let Some(delay) = delay else {
            tracing::error!(
                file_name = %file_name,
                attempts = attempt,
                error = %message,
                "Upload failed, attempts exhausted"
            );
            return Err(UploadError::Upload {
                file_name: file_name.to_string(),
                attempts: attempt,
                message,
            });
        };

        let transient = UploadError::TransientUpload {
            file_name: file_name.to_string(),
            attempt,
            message,
        };
        tracing::warn!(
            error = %transient,
            attempt = attempt,
            max_attempts = max_attempts,
            retry_in_ms = delay.as_millis() as u64,
            "Upload attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
