//! Error types module
//!
//! `AppError` is the error surface the image callers (avatar, post and comment
//! images) return. Pipeline and store errors are converted into it at the
//! crate boundaries so every failure can describe its own HTTP presentation.

use std::error::Error as _;
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected failures such as rejected uploads
    Debug,
    Warn,
    /// Unexpected failures
    Error,
}

/// How an error should be presented to a client
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Image store error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Presentation of one variant
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY_LATER: Option<&str> = Some("Retry after a short delay");

impl AppError {
    fn presentation(&self) -> Presentation {
        let (status, code, recoverable, action, sensitive, level) = match self {
            AppError::Database(_) => (500, "DATABASE_ERROR", true, RETRY_LATER, true, LogLevel::Error),
            AppError::Storage(_) => (500, "STORAGE_ERROR", true, RETRY_LATER, true, LogLevel::Error),
            AppError::InvalidInput(_) => (
                400,
                "INVALID_INPUT",
                false,
                Some("Check the uploaded files and try again"),
                false,
                LogLevel::Debug,
            ),
            AppError::NotFound(_) => (
                404,
                "NOT_FOUND",
                false,
                Some("Verify the account or image exists"),
                false,
                LogLevel::Debug,
            ),
            AppError::PayloadTooLarge(_) => (
                413,
                "PAYLOAD_TOO_LARGE",
                false,
                Some("Upload a smaller image"),
                false,
                LogLevel::Debug,
            ),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                (500, "INTERNAL_ERROR", true, RETRY_LATER, true, LogLevel::Error)
            }
        };
        Presentation {
            status,
            code,
            recoverable,
            action,
            sensitive,
            level,
        }
    }

    /// Variant name, for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Message followed by up to five `Caused by:` lines from the source chain
    pub fn detailed_message(&self) -> String {
        const MAX_DEPTH: usize = 5;

        let mut details = self.to_string();
        let mut chain = std::iter::successors(self.source(), |err| (*err).source());
        for cause in chain.by_ref().take(MAX_DEPTH) {
            details.push_str(&format!("\n  Caused by: {}", cause));
        }
        if chain.next().is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to save changes".to_string(),
            AppError::Storage(_) => "Failed to store image".to_string(),
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::PayloadTooLarge(msg) => {
                msg.clone()
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
