//! Write-side handle on the search index for one entity type.

use async_trait::async_trait;
use catalog_search_shared::IndexedRecord;
use tracing::debug;

use crate::errors::SearchError;

/// Abstracts index writes for one entity type (Solr, in-memory, etc.).
///
/// Implementations are registered per entity type and resolved by the core's
/// index registry. All methods return `Result<T, SearchError>`; a failed write
/// is always reported, never swallowed.
///
/// # Note on Upserts
///
/// `insert` and `update` both replace any existing document with the same id.
/// They differ only in commit behavior: `insert` always commits, while `update`
/// lets the caller defer the commit to batch many writes.
#[async_trait]
pub trait IndexHandle: Send + Sync {
    /// Index a record and commit.
    async fn insert(&self, record: &IndexedRecord) -> Result<(), SearchError>;

    /// Index a record, committing unless `defer_commit` is set.
    async fn update(&self, record: &IndexedRecord, defer_commit: bool)
        -> Result<(), SearchError>;

    /// Remove the document matching the record's id (or name).
    ///
    /// Only the id is read from the record. Removing a document that is not in
    /// the index is not an error.
    async fn remove(&self, record: &IndexedRecord) -> Result<(), SearchError>;

    /// Remove every document this handle owns.
    async fn clear(&self) -> Result<(), SearchError>;

    /// Make pending writes visible.
    async fn commit(&self) -> Result<(), SearchError>;
}

/// Handle for entity types that are not indexed. Every write is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndex;

#[async_trait]
impl IndexHandle for NoopIndex {
    async fn insert(&self, record: &IndexedRecord) -> Result<(), SearchError> {
        debug!(id = ?record.id(), "Discarding insert for unindexed type");
        Ok(())
    }

    async fn update(
        &self,
        record: &IndexedRecord,
        _defer_commit: bool,
    ) -> Result<(), SearchError> {
        debug!(id = ?record.id(), "Discarding update for unindexed type");
        Ok(())
    }

    async fn remove(&self, record: &IndexedRecord) -> Result<(), SearchError> {
        debug!(id = ?record.id(), "Discarding remove for unindexed type");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SearchError> {
        Ok(())
    }

    async fn commit(&self) -> Result<(), SearchError> {
        Ok(())
    }
}
