use chrono::{DateTime, Utc};
use quill_core::ImageDescriptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::Entity;

/// A user account; only the avatar matters here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<ImageDescriptor>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            avatar: None,
            updated_at: Utc::now(),
        }
    }
}

impl Entity for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// What a content image is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ImageOwner {
    Post(Uuid),
    Comment(Uuid),
}

impl ImageOwner {
    pub fn owner_id(&self) -> Uuid {
        match self {
            ImageOwner::Post(id) | ImageOwner::Comment(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ImageOwner::Post(_) => "post",
            ImageOwner::Comment(_) => "comment",
        }
    }
}

/// Persisted record of an image embedded in a post or comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentImage {
    pub id: Uuid,
    pub owner: ImageOwner,
    pub public_id: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

impl ContentImage {
    pub fn new(owner: ImageOwner, descriptor: ImageDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            public_id: descriptor.public_id,
            link: descriptor.link,
            created_at: Utc::now(),
        }
    }

    pub fn descriptor(&self) -> ImageDescriptor {
        ImageDescriptor::new(self.public_id.clone(), self.link.clone())
    }
}

impl Entity for ContentImage {
    fn id(&self) -> Uuid {
        self.id
    }
}
