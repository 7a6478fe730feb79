//! Entity type registries.
//!
//! Handles are registered once at startup and resolved by exact match on the
//! normalized [`EntityType`]. The two registries deliberately disagree on
//! unknown types: a write for a type nobody indexes is routine and resolves to
//! a [`NoopIndex`], while a query for such a type is a programming error.

use std::collections::HashMap;
use std::sync::Arc;

use catalog_search_repository::{IndexHandle, NoopIndex, QueryHandle, SearchError};
use catalog_search_shared::EntityType;
use tracing::warn;

/// Write-side registry.
#[derive(Default, Clone)]
pub struct IndexRegistry {
    handles: HashMap<EntityType, Arc<dyn IndexHandle>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handle for a type, replacing any previous one.
    pub fn register(mut self, entity_type: EntityType, handle: Arc<dyn IndexHandle>) -> Self {
        self.handles.insert(entity_type, handle);
        self
    }

    pub fn contains(&self, entity_type: &EntityType) -> bool {
        self.handles.contains_key(entity_type)
    }

    /// The handle for a type, or a no-op handle if the type is not indexed.
    pub fn index_for(&self, entity_type: &EntityType) -> Arc<dyn IndexHandle> {
        match self.handles.get(entity_type) {
            Some(handle) => Arc::clone(handle),
            None => {
                warn!(entity_type = %entity_type, "Unknown search type");
                Arc::new(NoopIndex)
            }
        }
    }
}

/// Read-side registry.
#[derive(Default, Clone)]
pub struct QueryRegistry {
    handles: HashMap<EntityType, Arc<dyn QueryHandle>>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handle for a type, replacing any previous one.
    pub fn register(mut self, entity_type: EntityType, handle: Arc<dyn QueryHandle>) -> Self {
        self.handles.insert(entity_type, handle);
        self
    }

    /// The handle for a type.
    ///
    /// # Returns
    ///
    /// * `Ok(handle)` - If the type is registered
    /// * `Err(SearchError::UnknownType)` - Otherwise
    pub fn query_for(&self, entity_type: &EntityType) -> Result<Arc<dyn QueryHandle>, SearchError> {
        self.handles
            .get(entity_type)
            .cloned()
            .ok_or_else(|| SearchError::unknown_type(entity_type.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_repository::MemoryIndex;

    #[test]
    fn test_index_for_registered_type() {
        let registry =
            IndexRegistry::new().register(EntityType::package(), Arc::new(MemoryIndex::new()));
        assert!(registry.contains(&EntityType::new(" PACKAGE ")));
    }

    #[tokio::test]
    async fn test_index_for_unknown_type_is_noop() {
        let index = Arc::new(MemoryIndex::new());
        let registry = IndexRegistry::new().register(EntityType::package(), index.clone());

        let handle = registry.index_for(&EntityType::new("group"));
        handle
            .insert(&catalog_search_shared::IndexedRecord::id_only("g1"))
            .await
            .unwrap();

        assert!(index.calls().await.is_empty());
    }

    #[test]
    fn test_query_for_unknown_type_is_an_error() {
        let registry =
            QueryRegistry::new().register(EntityType::package(), Arc::new(MemoryIndex::new()));

        assert!(registry.query_for(&EntityType::package()).is_ok());
        let err = registry.query_for(&EntityType::new("tag")).err().unwrap();
        assert!(matches!(err, SearchError::UnknownType(ref t) if t == "tag"));
    }
}
