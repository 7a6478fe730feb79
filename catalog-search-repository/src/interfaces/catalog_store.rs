//! Store-of-record contract.

use async_trait::async_trait;
use catalog_search_shared::{EntityType, IndexedRecord, RecordSummary};

use crate::errors::SearchError;

/// Which records an enumeration returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScope {
    /// Every record whose state is not `deleted` (drafts included).
    NotDeleted,
    /// Only records whose state is `active`.
    Active,
}

/// Read model over the relational store of record.
///
/// `fetch` returns the current, fully assembled view of a record (the output of
/// the dictization layer), never a partial diff.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch the current flattened view of a record by id or name.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexedRecord)` - The engine-ready record
    /// * `Err(SearchError::NotFound)` - If no such record exists
    /// * `Err(SearchError)` - If the store fails
    async fn fetch(&self, entity_type: &EntityType, id: &str)
        -> Result<IndexedRecord, SearchError>;

    /// Ids of the records in `scope`, in a stable order.
    async fn enumerate_ids(
        &self,
        entity_type: &EntityType,
        scope: IdScope,
    ) -> Result<Vec<String>, SearchError>;

    /// Name and last modification date of a record, for operator diagnostics.
    async fn summarize(
        &self,
        entity_type: &EntityType,
        id: &str,
    ) -> Result<Option<RecordSummary>, SearchError>;

    /// End the current store session, releasing anything held while streaming results.
    async fn commit(&self) -> Result<(), SearchError>;
}

/// Stand-in for a store of record that was not configured.
///
/// Lets index-only operations run without a database; every store call fails
/// with [`SearchError::StoreError`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedStore;

impl DetachedStore {
    fn unavailable() -> SearchError {
        SearchError::store("No store of record is configured")
    }
}

#[async_trait]
impl CatalogStore for DetachedStore {
    async fn fetch(
        &self,
        _entity_type: &EntityType,
        _id: &str,
    ) -> Result<IndexedRecord, SearchError> {
        Err(Self::unavailable())
    }

    async fn enumerate_ids(
        &self,
        _entity_type: &EntityType,
        _scope: IdScope,
    ) -> Result<Vec<String>, SearchError> {
        Err(Self::unavailable())
    }

    async fn summarize(
        &self,
        _entity_type: &EntityType,
        _id: &str,
    ) -> Result<Option<RecordSummary>, SearchError> {
        Err(Self::unavailable())
    }

    async fn commit(&self) -> Result<(), SearchError> {
        Err(Self::unavailable())
    }
}
