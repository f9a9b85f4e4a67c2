//! Persistence collaborator used by the services
//!
//! The services never talk to a database directly; whatever stores accounts
//! and content images implements [`Repository`] for that entity.

use async_trait::async_trait;
use quill_core::AppError;
use uuid::Uuid;

/// Anything a [`Repository`] can store
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

/// Generic CRUD repository
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError>;

    async fn add(&self, entity: T) -> Result<T, AppError>;

    /// Replace the stored entity with the same id
    async fn update(&self, entity: T) -> Result<T, AppError>;

    /// Remove by id; `false` if nothing was stored under it
    async fn remove(&self, id: Uuid) -> Result<bool, AppError>;
}
