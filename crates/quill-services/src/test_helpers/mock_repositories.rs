//! Mock repository implementation for testing

use async_trait::async_trait;
use quill_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::repository::{Entity, Repository};

/// HashMap-backed repository with failure injection
#[derive(Clone)]
pub struct MockRepository<T> {
    entities: Arc<Mutex<HashMap<Uuid, T>>>,
    /// `add` fails once this many entities have been added; `None` never fails
    fail_add_after: Arc<Mutex<Option<usize>>>,
    fail_updates: Arc<Mutex<bool>>,
    adds: Arc<AtomicUsize>,
}

impl<T: Entity> MockRepository<T> {
    pub fn new() -> Self {
        Self {
            entities: Arc::new(Mutex::new(HashMap::new())),
            fail_add_after: Arc::new(Mutex::new(None)),
            fail_updates: Arc::new(Mutex::new(false)),
            adds: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn insert(&self, entity: T) {
        self.entities.lock().unwrap().insert(entity.id(), entity);
    }

    pub fn fail_add_after(&self, successful_adds: usize) {
        *self.fail_add_after.lock().unwrap() = Some(successful_adds);
    }

    pub fn fail_updates(&self) {
        *self.fail_updates.lock().unwrap() = true;
    }

    pub fn snapshot(&self, id: Uuid) -> Option<T> {
        self.entities.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.lock().unwrap().len()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MockRepository<T> {
    async fn get(&self, id: Uuid) -> Result<Option<T>, AppError> {
        Ok(self.entities.lock().unwrap().get(&id).cloned())
    }

    async fn add(&self, entity: T) -> Result<T, AppError> {
        let limit = *self.fail_add_after.lock().unwrap();
        if let Some(limit) = limit {
            if self.adds.load(Ordering::SeqCst) >= limit {
                return Err(AppError::Database("insert failed".to_string()));
            }
        }
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.entities
            .lock()
            .unwrap()
            .insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, AppError> {
        if *self.fail_updates.lock().unwrap() {
            return Err(AppError::Database("update failed".to_string()));
        }
        let mut entities = self.entities.lock().unwrap();
        if !entities.contains_key(&entity.id()) {
            return Err(AppError::NotFound(format!("{} not found", entity.id())));
        }
        entities.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.entities.lock().unwrap().remove(&id).is_some())
    }
}
