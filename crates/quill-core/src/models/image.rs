use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single file payload owned by one upload call.
///
/// `content` is an immutable, reference-counted buffer: every upload attempt
/// receives a fresh view starting at offset 0 via [`UploadCandidate::rewind`].
#[derive(Debug, Clone, Validate)]
pub struct UploadCandidate {
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    pub content: Bytes,
    pub declared_content_type: String,
    pub size_bytes: u64,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        declared_content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            file_name: file_name.into(),
            size_bytes: content.len() as u64,
            declared_content_type: declared_content_type.into(),
            content,
        }
    }

    /// Full content, positioned at the start.
    pub fn rewind(&self) -> Bytes {
        self.content.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Remote store record of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Remote-store identifier
    pub public_id: String,
    /// Publicly resolvable URL
    pub link: String,
}

impl ImageDescriptor {
    pub fn new(public_id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            public_id: public_id.into(),
            link: link.into(),
        }
    }
}
