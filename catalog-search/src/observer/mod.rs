//! Automatic indexing on store commits.
//!
//! The storage layer publishes each committed transaction through a
//! [`ChangeFeed`]; the [`AutoIndexObserver`] registered on it keeps the index
//! in step for the tracked entity type.

mod feed;

pub use feed::{ChangeFeed, ChangeListener};

use std::sync::Arc;

use async_trait::async_trait;
use catalog_search_repository::{CatalogStore, SearchError};
use catalog_search_shared::{ChangeOperation, DomainEntity, EntityType, IndexedRecord};
use tracing::{debug, instrument};

use crate::dispatcher::ChangeDispatcher;

/// Runtime switch for automatic indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoIndexConfig {
    pub automatic_indexing: bool,
}

impl Default for AutoIndexConfig {
    fn default() -> Self {
        Self {
            automatic_indexing: true,
        }
    }
}

/// Forwards store commits of the tracked entity type to the dispatcher.
///
/// Only the primary catalog entity is tracked. Related entities reach the
/// index through their owner: changing one is expected to touch the owning
/// dataset, which is then re-fetched whole.
pub struct AutoIndexObserver {
    config: AutoIndexConfig,
    tracked: EntityType,
    store: Arc<dyn CatalogStore>,
    dispatcher: Arc<ChangeDispatcher>,
}

impl AutoIndexObserver {
    /// Create an observer tracking datasets.
    pub fn new(
        config: AutoIndexConfig,
        store: Arc<dyn CatalogStore>,
        dispatcher: Arc<ChangeDispatcher>,
    ) -> Self {
        Self::tracking(EntityType::package(), config, store, dispatcher)
    }

    /// Create an observer tracking another entity type.
    pub fn tracking(
        tracked: EntityType,
        config: AutoIndexConfig,
        store: Arc<dyn CatalogStore>,
        dispatcher: Arc<ChangeDispatcher>,
    ) -> Self {
        Self {
            config,
            tracked,
            store,
            dispatcher,
        }
    }

    pub fn config(&self) -> AutoIndexConfig {
        self.config
    }
}

#[async_trait]
impl ChangeListener for AutoIndexObserver {
    #[instrument(skip(self, entity), fields(id = %entity.id(), operation = %operation))]
    async fn notify(
        &self,
        entity: &dyn DomainEntity,
        operation: ChangeOperation,
    ) -> Result<(), SearchError> {
        let entity_type = entity.entity_type();
        if entity_type != self.tracked || !self.config.automatic_indexing {
            debug!(entity_type = %entity_type, "Skipping automatic indexing");
            return Ok(());
        }

        match operation {
            ChangeOperation::Created | ChangeOperation::Changed => {
                // Index the assembled post-commit view, not the changed columns.
                let record = self.store.fetch(&entity_type, entity.id()).await?;
                self.dispatcher
                    .dispatch(&entity_type, &record, operation)
                    .await
            }
            ChangeOperation::Deleted => {
                self.dispatcher
                    .dispatch(&entity_type, &IndexedRecord::id_only(entity.id()), operation)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::IndexRegistry;
    use catalog_search_repository::{IndexCall, MemoryCatalogStore, MemoryIndex, QueryHandle};
    use catalog_search_shared::{EntityKind, Package};

    struct Resource {
        id: String,
    }

    impl EntityKind for Resource {
        const TYPE_NAME: &'static str = "Resource";
    }

    impl DomainEntity for Resource {
        fn id(&self) -> &str {
            &self.id
        }

        fn entity_type(&self) -> EntityType {
            EntityType::of::<Self>()
        }
    }

    async fn setup(enabled: bool) -> (AutoIndexObserver, Arc<MemoryIndex>) {
        let index = Arc::new(MemoryIndex::new());
        let store = Arc::new(MemoryCatalogStore::new());
        store
            .put_package(
                IndexedRecord::id_only("abc")
                    .with("name", "rainfall")
                    .with("title", "Annual rainfall")
                    .with("tags", vec!["weather"]),
            )
            .await;

        let registry = IndexRegistry::new()
            .register(EntityType::package(), index.clone())
            .register(EntityType::new("resource"), index.clone());
        let dispatcher = Arc::new(ChangeDispatcher::new(Arc::new(registry)));
        let observer = AutoIndexObserver::new(
            AutoIndexConfig {
                automatic_indexing: enabled,
            },
            store,
            dispatcher,
        );
        (observer, index)
    }

    #[tokio::test]
    async fn test_changed_package_is_refetched_and_indexed() {
        let (observer, index) = setup(true).await;
        let stale = Package::new("abc", "old-name");

        observer
            .notify(&stale, ChangeOperation::Changed)
            .await
            .unwrap();

        let indexed = index.get_index("abc").await.unwrap().unwrap();
        assert_eq!(indexed.name(), Some("rainfall"));
        assert_eq!(indexed.get("title").and_then(|v| v.as_str()), Some("Annual rainfall"));
    }

    #[tokio::test]
    async fn test_deleted_package_dispatches_id_only() {
        let (observer, index) = setup(true).await;
        let gone = Package::new("zzz", "already-gone");

        observer
            .notify(&gone, ChangeOperation::Deleted)
            .await
            .unwrap();

        assert_eq!(index.calls().await, vec![IndexCall::Remove("zzz".to_string())]);
    }

    #[tokio::test]
    async fn test_untracked_types_are_ignored() {
        let (observer, index) = setup(true).await;
        let resource = Resource {
            id: "r1".to_string(),
        };

        observer
            .notify(&resource, ChangeOperation::Created)
            .await
            .unwrap();

        assert!(index.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_flag_suppresses_indexing() {
        let (observer, index) = setup(false).await;

        observer
            .notify(&Package::new("abc", "rainfall"), ChangeOperation::Created)
            .await
            .unwrap();

        assert!(index.calls().await.is_empty());
        assert!(!observer.config().automatic_indexing);
    }

    #[tokio::test]
    async fn test_missing_record_on_change_is_an_error() {
        let (observer, index) = setup(true).await;

        let result = observer
            .notify(&Package::new("nope", "nope"), ChangeOperation::Changed)
            .await;

        assert!(matches!(result.unwrap_err(), SearchError::NotFound(_)));
        assert!(index.calls().await.is_empty());
    }
}
