//! Entity service boundary.
//!
//! Aggregates are persisted by an external collaborator; workflow actions
//! only read and write snapshots through this trait. The in-memory
//! implementation backs tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::AggregateId;
use domain::AggregateRoot;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the entity service boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No entity is stored under the given identity.
    #[error("Entity not found: {0}")]
    NotFound(AggregateId),

    /// The service could not be reached or rejected the write.
    #[error("Entity service unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to one domain's persisted aggregates.
#[async_trait]
pub trait EntityService<A: AggregateRoot>: Send + Sync {
    /// Loads an aggregate snapshot, or None if it does not exist.
    async fn get(&self, id: AggregateId) -> Result<Option<A>, ServiceError>;

    /// Writes an aggregate snapshot back; the entity must already exist.
    ///
    /// Returns the stored snapshot. Concurrent replications of the same
    /// aggregate may race here; conditional-update semantics are the
    /// store's concern, not this interface's.
    async fn update(&self, aggregate: A) -> Result<A, ServiceError>;

    /// Returns true if an aggregate exists under the given identity.
    async fn exists(&self, id: AggregateId) -> Result<bool, ServiceError>;
}

/// In-memory entity service for tests and local runs.
#[derive(Clone)]
pub struct InMemoryEntityService<A: AggregateRoot> {
    entities: Arc<RwLock<HashMap<AggregateId, A>>>,
    fail_on_update: Arc<AtomicBool>,
}

impl<A: AggregateRoot> Default for InMemoryEntityService<A> {
    fn default() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
            fail_on_update: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<A: AggregateRoot> InMemoryEntityService<A> {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an aggregate, as the out-of-scope CRUD layer would on create.
    pub async fn put(&self, aggregate: A) {
        self.entities.write().await.insert(aggregate.id(), aggregate);
    }

    /// Configures update calls to fail until reset.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.fail_on_update.store(fail, Ordering::SeqCst);
    }

    /// Number of stored aggregates.
    pub async fn count(&self) -> usize {
        self.entities.read().await.len()
    }
}

#[async_trait]
impl<A: AggregateRoot> EntityService<A> for InMemoryEntityService<A> {
    async fn get(&self, id: AggregateId) -> Result<Option<A>, ServiceError> {
        Ok(self.entities.read().await.get(&id).cloned())
    }

    async fn update(&self, aggregate: A) -> Result<A, ServiceError> {
        if self.fail_on_update.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("update rejected".to_string()));
        }

        let mut entities = self.entities.write().await;
        if !entities.contains_key(&aggregate.id()) {
            return Err(ServiceError::NotFound(aggregate.id()));
        }
        entities.insert(aggregate.id(), aggregate.clone());
        Ok(aggregate)
    }

    async fn exists(&self, id: AggregateId) -> Result<bool, ServiceError> {
        Ok(self.entities.read().await.contains_key(&id))
    }
}
