//! Listener registration for store commits.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_search_repository::SearchError;
use catalog_search_shared::{ChangeOperation, ChangeSet, DomainEntity};
use tracing::debug;

/// Receives one notification per changed entity after the store commits.
#[async_trait]
pub trait ChangeListener: Send + Sync {
    async fn notify(
        &self,
        entity: &dyn DomainEntity,
        operation: ChangeOperation,
    ) -> Result<(), SearchError>;
}

/// Listeners the storage layer calls, in registration order, after each commit.
#[derive(Default, Clone)]
pub struct ChangeFeed {
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver a committed transaction's changes.
    ///
    /// Stops at the first listener error and returns it to the committing caller.
    pub async fn publish(&self, changes: &ChangeSet) -> Result<(), SearchError> {
        debug!(changes = changes.len(), listeners = self.listeners.len(), "Publishing changes");
        for (entity, operation) in changes.entries() {
            for listener in &self.listeners {
                listener.notify(entity.as_ref(), operation).await?;
            }
        }
        Ok(())
    }
}
