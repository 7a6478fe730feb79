//! Change dispatch.
//!
//! Routes a change notification to the index handle registered for its entity
//! type and invokes the matching write.

mod registry;

pub use registry::{IndexRegistry, QueryRegistry};

use std::sync::Arc;

use catalog_search_repository::SearchError;
use catalog_search_shared::{ChangeOperation, EntityType, IndexedRecord};
use tracing::{debug, error, instrument};

/// Stateless router from change notifications to index writes.
///
/// Index write failures are logged and returned to the caller, never swallowed:
/// a lost update on an indexed type means the index silently diverges from the
/// store of record.
#[derive(Clone)]
pub struct ChangeDispatcher {
    registry: Arc<IndexRegistry>,
}

impl ChangeDispatcher {
    pub fn new(registry: Arc<IndexRegistry>) -> Self {
        Self { registry }
    }

    /// Apply one change to the index.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - Type of the changed entity
    /// * `entity` - The full record for creates and changes; only its id is used for deletes
    /// * `operation` - What happened to the entity
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the write succeeded, or the type is not indexed
    /// * `Err(SearchError)` - If the index handle failed
    #[instrument(skip(self, entity), fields(entity_type = %entity_type, operation = %operation, id = ?entity.id()))]
    pub async fn dispatch(
        &self,
        entity_type: &EntityType,
        entity: &IndexedRecord,
        operation: ChangeOperation,
    ) -> Result<(), SearchError> {
        let index = self.registry.index_for(entity_type);

        let result = match operation {
            ChangeOperation::Created => index.insert(entity).await,
            ChangeOperation::Changed => index.update(entity, false).await,
            ChangeOperation::Deleted => {
                let minimal = entity
                    .id()
                    .map(IndexedRecord::id_only)
                    .unwrap_or_else(|| entity.clone());
                index.remove(&minimal).await
            }
        };

        match &result {
            Ok(()) => debug!("Change dispatched"),
            Err(e) => error!(error = %e, details = ?e, "Failed to apply change to search index"),
        }
        result
    }
}
