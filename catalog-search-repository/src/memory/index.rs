//! In-memory search index.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use catalog_search_shared::IndexedRecord;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::SearchError;
use crate::interfaces::{IndexHandle, QueryHandle};

/// A write call received by a [`MemoryIndex`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    Insert(String),
    Update { id: String, defer_commit: bool },
    Remove(String),
    Clear,
    Commit,
}

#[derive(Default)]
struct IndexState {
    committed: BTreeMap<String, IndexedRecord>,
    pending: BTreeMap<String, IndexedRecord>,
    failing: HashSet<String>,
    calls: Vec<IndexCall>,
}

impl IndexState {
    fn write(&mut self, record: &IndexedRecord, commit: bool) -> Result<(), SearchError> {
        let id = record
            .id()
            .ok_or_else(|| SearchError::index_write("Record has no id"))?
            .to_string();

        if self.failing.contains(&id) {
            return Err(SearchError::index_write(format!(
                "Injected write failure for {}",
                id
            )));
        }

        self.pending.insert(id, record.clone());
        if commit {
            self.commit();
        }
        Ok(())
    }

    fn commit(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.committed.extend(pending);
    }
}

fn matches_reference(record: &IndexedRecord, reference: &str) -> bool {
    record.id() == Some(reference) || record.name() == Some(reference)
}

/// Index held in process memory.
///
/// Writes made with a deferred commit stay invisible to queries until
/// [`IndexHandle::commit`] is called, like a real engine.
#[derive(Default)]
pub struct MemoryIndex {
    state: Mutex<IndexState>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write of the given record id fail with an index write error.
    pub async fn fail_writes_for(&self, id: impl Into<String>) {
        self.state.lock().await.failing.insert(id.into());
    }

    /// Every write call received so far.
    pub async fn calls(&self) -> Vec<IndexCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of insert and update calls received so far.
    pub async fn upsert_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, IndexCall::Insert(_) | IndexCall::Update { .. }))
            .count()
    }

    /// Number of committed documents.
    pub async fn len(&self) -> usize {
        self.state.lock().await.committed.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of written but uncommitted documents.
    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.pending.len()
    }
}

#[async_trait]
impl IndexHandle for MemoryIndex {
    async fn insert(&self, record: &IndexedRecord) -> Result<(), SearchError> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(IndexCall::Insert(record.id().unwrap_or_default().to_string()));
        state.write(record, true)
    }

    async fn update(
        &self,
        record: &IndexedRecord,
        defer_commit: bool,
    ) -> Result<(), SearchError> {
        let mut state = self.state.lock().await;
        state.calls.push(IndexCall::Update {
            id: record.id().unwrap_or_default().to_string(),
            defer_commit,
        });
        state.write(record, !defer_commit)
    }

    async fn remove(&self, record: &IndexedRecord) -> Result<(), SearchError> {
        let id = record
            .id()
            .ok_or_else(|| SearchError::index_write("Record has no id"))?;

        let mut state = self.state.lock().await;
        state.calls.push(IndexCall::Remove(id.to_string()));
        state.committed.retain(|_, r| !matches_reference(r, id));
        state.pending.retain(|_, r| !matches_reference(r, id));

        debug!(id = %id, "Document removed from memory index");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SearchError> {
        let mut state = self.state.lock().await;
        state.calls.push(IndexCall::Clear);
        state.committed.clear();
        state.pending.clear();
        Ok(())
    }

    async fn commit(&self) -> Result<(), SearchError> {
        let mut state = self.state.lock().await;
        state.calls.push(IndexCall::Commit);
        state.commit();
        Ok(())
    }
}

#[async_trait]
impl QueryHandle for MemoryIndex {
    async fn get_all_entity_ids(&self, max_results: usize) -> Result<Vec<String>, SearchError> {
        Ok(self
            .state
            .lock()
            .await
            .committed
            .keys()
            .take(max_results)
            .cloned()
            .collect())
    }

    async fn get_index(&self, reference: &str) -> Result<Option<IndexedRecord>, SearchError> {
        let state = self.state.lock().await;
        if let Some(record) = state.committed.get(reference) {
            return Ok(Some(record.clone()));
        }
        Ok(state
            .committed
            .values()
            .find(|r| matches_reference(r, reference))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> IndexedRecord {
        IndexedRecord::id_only(id).with("name", name)
    }

    #[tokio::test]
    async fn test_insert_is_visible() {
        let index = MemoryIndex::new();
        index.insert(&record("a", "alpha")).await.unwrap();

        assert_eq!(index.len().await, 1);
        assert_eq!(index.get_all_entity_ids(10).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_deferred_update_needs_commit() {
        let index = MemoryIndex::new();
        index.update(&record("a", "alpha"), true).await.unwrap();

        assert!(index.get_index("a").await.unwrap().is_none());
        assert_eq!(index.pending_len().await, 1);

        index.commit().await.unwrap();
        assert!(index.get_index("a").await.unwrap().is_some());
        assert_eq!(index.pending_len().await, 0);
    }

    #[tokio::test]
    async fn test_lookup_and_remove_by_name() {
        let index = MemoryIndex::new();
        index.insert(&record("a", "alpha")).await.unwrap();

        let found = index.get_index("alpha").await.unwrap().unwrap();
        assert_eq!(found.id(), Some("a"));

        index.remove(&IndexedRecord::id_only("alpha")).await.unwrap();
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let index = MemoryIndex::new();
        index.fail_writes_for("a").await;

        let result = index.insert(&record("a", "alpha")).await;
        assert!(matches!(
            result.unwrap_err(),
            SearchError::IndexWriteError(_)
        ));
        assert!(index.is_empty().await);
        assert_eq!(index.calls().await, vec![IndexCall::Insert("a".to_string())]);
    }

    #[tokio::test]
    async fn test_enumeration_respects_max_results() {
        let index = MemoryIndex::new();
        for id in ["a", "b", "c"] {
            index.insert(&record(id, id)).await.unwrap();
        }
        assert_eq!(index.get_all_entity_ids(2).await.unwrap().len(), 2);
        assert!(index.get_all_entity_ids(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let index = MemoryIndex::new();
        index.insert(&record("a", "alpha")).await.unwrap();
        index.update(&record("b", "beta"), true).await.unwrap();
        index.clear().await.unwrap();

        assert!(index.is_empty().await);
        assert_eq!(index.pending_len().await, 0);
    }
}
