//! Read-side handle on the search index, used for consistency checks.

use async_trait::async_trait;
use catalog_search_shared::IndexedRecord;

use crate::errors::SearchError;

/// Abstracts index reads for one entity type.
///
/// Only the reads needed to compare the index against the store of record are
/// part of this contract; ranked search queries are served elsewhere.
#[async_trait]
pub trait QueryHandle: Send + Sync {
    /// Ids of all indexed documents, up to `max_results`.
    ///
    /// # Arguments
    ///
    /// * `max_results` - Upper bound on the number of ids returned
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - The indexed ids, in engine order
    /// * `Err(SearchError)` - If the engine cannot be queried
    async fn get_all_entity_ids(&self, max_results: usize) -> Result<Vec<String>, SearchError>;

    /// The stored document for a record, looked up by id or by name.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The document as the index holds it
    /// * `Ok(None)` - If nothing in the index matches the reference
    /// * `Err(SearchError)` - If the engine cannot be queried
    async fn get_index(&self, reference: &str) -> Result<Option<IndexedRecord>, SearchError>;
}
