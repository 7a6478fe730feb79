//! Bulk index operations.
//!
//! Operator-driven rebuild, drift check, inspection and clearing for one
//! entity type. Each operation runs to completion on the calling task.

mod report;

pub use report::{CheckReport, RebuildOptions, RebuildOutcome, RebuildSelector, RebuildSummary};

use std::collections::HashSet;
use std::sync::Arc;

use catalog_search_repository::{CatalogStore, IdScope, IndexHandle, QueryHandle, SearchError};
use catalog_search_shared::{EntityType, IndexedRecord};
use tracing::{debug, error, info, instrument, warn};

use crate::dispatcher::{IndexRegistry, QueryRegistry};
use report::RebuildPhase;

/// Rebuilds and inspects the index for a single entity type.
pub struct BulkIndexEngine {
    entity_type: EntityType,
    index: Arc<dyn IndexHandle>,
    query: Arc<dyn QueryHandle>,
    store: Arc<dyn CatalogStore>,
}

impl BulkIndexEngine {
    pub fn new(
        entity_type: EntityType,
        index: Arc<dyn IndexHandle>,
        query: Arc<dyn QueryHandle>,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            entity_type,
            index,
            query,
            store,
        }
    }

    /// Resolve the handles for `entity_type` from the registries.
    ///
    /// Fails with [`SearchError::UnknownType`] if the type cannot be queried.
    pub fn from_registries(
        entity_type: EntityType,
        indexes: &IndexRegistry,
        queries: &QueryRegistry,
        store: Arc<dyn CatalogStore>,
    ) -> Result<Self, SearchError> {
        let query = queries.query_for(&entity_type)?;
        let index = indexes.index_for(&entity_type);
        Ok(Self::new(entity_type, index, query, store))
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Rebuild the index for the selected records.
    ///
    /// Every path that runs to the end commits the store-of-record session.
    /// The index commit is governed by `options.defer_commit`.
    ///
    /// # Returns
    ///
    /// * `Ok(RebuildSummary)` - The run completed, possibly with tolerated failures
    /// * `Err(SearchError::RebuildError)` - A record failed and `force` was not set
    /// * `Err(SearchError)` - Enumeration, diffing or a single-record rebuild failed
    #[instrument(skip(self, options), fields(entity_type = %self.entity_type))]
    pub async fn rebuild(
        &self,
        selector: RebuildSelector,
        options: RebuildOptions,
    ) -> Result<RebuildSummary, SearchError> {
        info!("Rebuilding search index");

        let summary = match selector {
            RebuildSelector::One(id) => self.rebuild_one(&id).await?,
            RebuildSelector::Many(ids) => self.rebuild_many(&ids, options).await?,
            RebuildSelector::All => self.rebuild_all(options).await?,
        };

        self.enter(RebuildPhase::Committing);
        self.store.commit().await?;
        self.enter(RebuildPhase::Done);

        info!(
            total = summary.total,
            indexed = summary.indexed,
            failed = summary.failed(),
            "Finished rebuilding search index"
        );
        Ok(summary)
    }

    async fn rebuild_one(&self, id: &str) -> Result<RebuildSummary, SearchError> {
        let record = self.store.fetch(&self.entity_type, id).await?;
        info!(id = %id, name = ?record.name(), "Indexing single record");

        // Drop whatever the index holds first so a drifted key cannot leave a duplicate.
        self.index.remove(&record).await?;
        self.index.insert(&record).await?;

        Ok(RebuildSummary {
            total: 1,
            indexed: 1,
            failed_ids: Vec::new(),
            outcome: RebuildOutcome::Completed,
        })
    }

    async fn rebuild_many(
        &self,
        ids: &[String],
        options: RebuildOptions,
    ) -> Result<RebuildSummary, SearchError> {
        let summary = self.process(ids, options, true).await?;

        if !options.defer_commit {
            self.index.commit().await?;
        }
        Ok(summary)
    }

    async fn rebuild_all(&self, options: RebuildOptions) -> Result<RebuildSummary, SearchError> {
        self.enter(RebuildPhase::Enumerating);
        let mut ids = self
            .store
            .enumerate_ids(&self.entity_type, IdScope::NotDeleted)
            .await?;

        if options.only_missing {
            self.enter(RebuildPhase::Diffing);
            info!("Indexing only missing records");
            ids = self.missing_from_index(ids).await?;
            if ids.is_empty() {
                info!("All records are already indexed");
                return Ok(RebuildSummary::nothing_missing());
            }
        } else {
            info!("Rebuilding the whole index");
            if options.clear_first {
                self.enter(RebuildPhase::Clearing);
                self.index.clear().await?;
            }
        }

        self.process(&ids, options, options.defer_commit).await
    }

    /// Fetch and upsert each id in order, applying the per-record failure policy.
    async fn process(
        &self,
        ids: &[String],
        options: RebuildOptions,
        defer_commit: bool,
    ) -> Result<RebuildSummary, SearchError> {
        self.enter(RebuildPhase::Processing);
        let total = ids.len();
        let mut summary = RebuildSummary {
            total,
            indexed: 0,
            failed_ids: Vec::new(),
            outcome: RebuildOutcome::Completed,
        };

        for (position, id) in ids.iter().enumerate() {
            if !options.quiet {
                info!(current = position + 1, total = total, "Indexing record");
            }

            match self.reindex(id, defer_commit).await {
                Ok(()) => summary.indexed += 1,
                Err(e) => {
                    error!(id = %id, error = %e, details = ?e, "Error while indexing record");
                    if !options.force {
                        self.enter(RebuildPhase::Aborted);
                        return Err(SearchError::rebuild(id.as_str(), e.to_string()));
                    }
                    summary.failed_ids.push(id.clone());
                }
            }
        }

        if !summary.failed_ids.is_empty() {
            warn!(failed = summary.failed(), "Rebuild skipped failing records");
        }
        Ok(summary)
    }

    async fn reindex(&self, id: &str, defer_commit: bool) -> Result<(), SearchError> {
        let record = self.store.fetch(&self.entity_type, id).await?;
        self.index.update(&record, defer_commit).await
    }

    /// Ids from `ids` the index does not hold, keeping their order.
    async fn missing_from_index(&self, ids: Vec<String>) -> Result<Vec<String>, SearchError> {
        // Unbounded so stale extra documents cannot crowd live ids out of the page.
        let indexed: HashSet<String> = self
            .query
            .get_all_entity_ids(usize::MAX)
            .await?
            .into_iter()
            .collect();

        Ok(ids.into_iter().filter(|id| !indexed.contains(id)).collect())
    }

    /// Flush pending index writes.
    #[instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn commit(&self) -> Result<(), SearchError> {
        self.index.commit().await?;
        info!("Committed pending changes on the search index");
        Ok(())
    }

    /// Active records in the store that the index does not hold.
    ///
    /// Read-only on both sides.
    #[instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn check(&self) -> Result<CheckReport, SearchError> {
        let active = self
            .store
            .enumerate_ids(&self.entity_type, IdScope::Active)
            .await?;
        let total_active = active.len();
        let missing_ids = self.missing_from_index(active).await?;

        let mut missing = Vec::with_capacity(missing_ids.len());
        for id in &missing_ids {
            match self.store.summarize(&self.entity_type, id).await? {
                Some(summary) => missing.push(summary),
                None => warn!(id = %id, "Missing record vanished from the store during check"),
            }
        }

        info!(
            total_active = total_active,
            missing = missing.len(),
            "Index check finished"
        );
        Ok(CheckReport {
            total_active,
            missing,
        })
    }

    /// The index's stored document for an id or name.
    #[instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn show(&self, reference: &str) -> Result<Option<IndexedRecord>, SearchError> {
        self.query.get_index(reference).await
    }

    /// Remove one record from the index.
    #[instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn clear(&self, reference: &str) -> Result<(), SearchError> {
        self.index.remove(&IndexedRecord::id_only(reference)).await?;
        info!(reference = %reference, "Cleared record from the search index");
        Ok(())
    }

    /// Remove every document from the index.
    #[instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn clear_all(&self) -> Result<(), SearchError> {
        self.index.clear().await?;
        info!("Cleared the search index");
        Ok(())
    }

    fn enter(&self, phase: RebuildPhase) {
        debug!(phase = phase.as_str(), "Rebuild phase");
    }
}
