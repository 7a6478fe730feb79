//! Dependency initialization and wiring for the catalog search synchronizer.

use std::sync::Arc;

use catalog_search_repository::{
    CatalogStore, DetachedStore, IndexHandle, PostgresCatalogStore, QueryHandle, SchemaProvider,
    SolrProvider,
};
use catalog_search_shared::EntityType;
use tracing::info;

use crate::bulk::BulkIndexEngine;
use crate::config::Settings;
use crate::dispatcher::{ChangeDispatcher, IndexRegistry, QueryRegistry};
use crate::observer::{AutoIndexConfig, AutoIndexObserver, ChangeFeed};
use crate::schema::SchemaCompatibilityGate;
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Listeners to hand to the storage layer; the auto-index observer is registered.
    pub feed: ChangeFeed,
    pub dispatcher: Arc<ChangeDispatcher>,
    /// Bulk operations on datasets.
    pub engine: BulkIndexEngine,
    pub gate: SchemaCompatibilityGate,
}

impl Dependencies {
    /// Initialize all dependencies against Solr and PostgreSQL.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If `DATABASE_URL` is missing or a connection fails
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        let database_url = settings
            .database_url
            .as_deref()
            .ok_or_else(|| IndexingError::config("DATABASE_URL is not set"))?;

        info!(
            solr_url = %settings.solr.base_url(),
            site_id = %settings.solr.site_id,
            automatic_indexing = settings.auto_index.automatic_indexing,
            "Initializing dependencies"
        );

        let solr = Arc::new(Self::solr_provider(settings)?);
        let store = PostgresCatalogStore::connect(database_url)
            .await
            .map_err(|e| IndexingError::config(format!("Failed to connect to database: {}", e)))?;

        info!("Database connection established");

        Self::wire(
            solr.clone(),
            solr.clone(),
            solr,
            Arc::new(store),
            settings.auto_index,
        )
    }

    /// Initialize against Solr only, for operations that never read the store of record.
    ///
    /// `show`, `clear`, `clear_all` and `commit` work on the result; anything
    /// reading the store fails with [`SearchError::StoreError`].
    ///
    /// [`SearchError::StoreError`]: catalog_search_repository::SearchError::StoreError
    pub fn index_only(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            solr_url = %settings.solr.base_url(),
            site_id = %settings.solr.site_id,
            "Initializing index-only dependencies"
        );

        let solr = Arc::new(Self::solr_provider(settings)?);
        Self::wire(
            solr.clone(),
            solr.clone(),
            solr,
            Arc::new(DetachedStore),
            settings.auto_index,
        )
    }

    /// Build only the schema gate. It needs the engine but not the store of record.
    pub fn schema_gate(settings: &Settings) -> Result<SchemaCompatibilityGate, IndexingError> {
        let solr = Self::solr_provider(settings)?;
        Ok(SchemaCompatibilityGate::new(Arc::new(solr)))
    }

    /// Wire the core around the given collaborators.
    ///
    /// Datasets are the only indexed and queryable type.
    pub fn wire(
        index: Arc<dyn IndexHandle>,
        query: Arc<dyn QueryHandle>,
        schema: Arc<dyn SchemaProvider>,
        store: Arc<dyn CatalogStore>,
        auto_index: AutoIndexConfig,
    ) -> Result<Self, IndexingError> {
        let package = EntityType::package();
        let indexes = IndexRegistry::new().register(package.clone(), index);
        let queries = QueryRegistry::new().register(package.clone(), query);

        let engine = BulkIndexEngine::from_registries(package, &indexes, &queries, store.clone())?;
        let dispatcher = Arc::new(ChangeDispatcher::new(Arc::new(indexes)));

        let mut feed = ChangeFeed::new();
        feed.register(Arc::new(AutoIndexObserver::new(
            auto_index,
            store,
            dispatcher.clone(),
        )));

        Ok(Self {
            feed,
            dispatcher,
            engine,
            gate: SchemaCompatibilityGate::new(schema),
        })
    }

    fn solr_provider(settings: &Settings) -> Result<SolrProvider, IndexingError> {
        SolrProvider::new(settings.solr.clone(), EntityType::package()).map_err(|e| {
            IndexingError::config(format!("Failed to create Solr provider: {}", e))
        })
    }
}
