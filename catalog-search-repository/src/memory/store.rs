//! In-memory store of record.

use std::collections::HashSet;

use async_trait::async_trait;
use catalog_search_shared::{EntityState, EntityType, IndexedRecord, RecordSummary};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::errors::SearchError;
use crate::interfaces::{CatalogStore, IdScope};

struct StoredRecord {
    entity_type: EntityType,
    record: IndexedRecord,
    state: EntityState,
    metadata_modified: Option<DateTime<Utc>>,
}

impl StoredRecord {
    fn id(&self) -> &str {
        self.record.id().unwrap_or_default()
    }

    fn matches(&self, entity_type: &EntityType, reference: &str) -> bool {
        &self.entity_type == entity_type
            && (self.id() == reference || self.record.name() == Some(reference))
    }
}

#[derive(Default)]
struct StoreState {
    records: Vec<StoredRecord>,
    failing: HashSet<String>,
    commits: usize,
}

/// Store of record held in process memory. Records keep insertion order.
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: Mutex<StoreState>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record. Records without an id are ignored.
    pub async fn put(
        &self,
        entity_type: EntityType,
        record: IndexedRecord,
        state: EntityState,
        metadata_modified: Option<DateTime<Utc>>,
    ) {
        let Some(id) = record.id().map(str::to_string) else {
            return;
        };

        let mut store = self.state.lock().await;
        let stored = StoredRecord {
            entity_type,
            record,
            state,
            metadata_modified,
        };
        match store
            .records
            .iter_mut()
            .find(|r| r.entity_type == stored.entity_type && r.id() == id)
        {
            Some(existing) => *existing = stored,
            None => store.records.push(stored),
        }
    }

    /// Add an active package.
    pub async fn put_package(&self, record: IndexedRecord) {
        self.put(EntityType::package(), record, EntityState::Active, Some(Utc::now()))
            .await;
    }

    /// Change the state of a record, if it exists.
    pub async fn set_state(&self, entity_type: &EntityType, id: &str, state: EntityState) {
        let mut store = self.state.lock().await;
        if let Some(record) = store
            .records
            .iter_mut()
            .find(|r| &r.entity_type == entity_type && r.id() == id)
        {
            record.state = state;
        }
    }

    /// Make every fetch of the given id fail with a store error.
    pub async fn fail_fetch_for(&self, id: impl Into<String>) {
        self.state.lock().await.failing.insert(id.into());
    }

    /// Number of session commits received.
    pub async fn commit_count(&self) -> usize {
        self.state.lock().await.commits
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn fetch(
        &self,
        entity_type: &EntityType,
        id: &str,
    ) -> Result<IndexedRecord, SearchError> {
        let store = self.state.lock().await;
        if store.failing.contains(id) {
            return Err(SearchError::store(format!("Injected fetch failure for {}", id)));
        }

        store
            .records
            .iter()
            .find(|r| r.matches(entity_type, id))
            .map(|r| r.record.clone())
            .ok_or_else(|| SearchError::not_found(format!("{} {}", entity_type, id)))
    }

    async fn enumerate_ids(
        &self,
        entity_type: &EntityType,
        scope: IdScope,
    ) -> Result<Vec<String>, SearchError> {
        let store = self.state.lock().await;
        Ok(store
            .records
            .iter()
            .filter(|r| &r.entity_type == entity_type)
            .filter(|r| match scope {
                IdScope::NotDeleted => r.state != EntityState::Deleted,
                IdScope::Active => r.state == EntityState::Active,
            })
            .map(|r| r.id().to_string())
            .collect())
    }

    async fn summarize(
        &self,
        entity_type: &EntityType,
        id: &str,
    ) -> Result<Option<RecordSummary>, SearchError> {
        let store = self.state.lock().await;
        Ok(store
            .records
            .iter()
            .find(|r| &r.entity_type == entity_type && r.id() == id)
            .map(|r| RecordSummary {
                id: r.id().to_string(),
                name: r.record.name().unwrap_or_default().to_string(),
                metadata_modified: r.metadata_modified,
            }))
    }

    async fn commit(&self) -> Result<(), SearchError> {
        self.state.lock().await.commits += 1;
        Ok(())
    }
}
