//! PostgreSQL-backed catalog store.
//!
//! Reads datasets from the `package` table. Rows are flattened with
//! `row_to_json`, plus the dataset's active tag names; anything richer belongs
//! to the dictization layer.

use async_trait::async_trait;
use catalog_search_shared::{EntityType, IndexedRecord, RecordSummary};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::SearchError;
use crate::interfaces::{CatalogStore, IdScope};

/// PostgreSQL-backed store of record.
pub struct PostgresCatalogStore {
    /// PostgreSQL connection pool
    pool: sqlx::PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new store over a pool connected to the catalog database.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the catalog database.
    ///
    /// # Arguments
    ///
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresCatalogStore)` - Ready-to-use store
    /// * `Err(SearchError::StoreError)` - If the connection fails
    pub async fn connect(database_url: &str) -> Result<Self, SearchError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Only datasets live in the `package` table.
    fn ensure_package(entity_type: &EntityType) -> Result<(), SearchError> {
        if entity_type == &EntityType::package() {
            Ok(())
        } else {
            Err(SearchError::unknown_type(entity_type.as_str()))
        }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn fetch(
        &self,
        entity_type: &EntityType,
        id: &str,
    ) -> Result<IndexedRecord, SearchError> {
        Self::ensure_package(entity_type)?;

        let row: Option<String> = sqlx::query_scalar(
            "SELECT row_to_json(p)::text FROM package p WHERE p.id = $1 OR p.name = $1 LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let json = row.ok_or_else(|| SearchError::not_found(format!("package {}", id)))?;
        let fields: Map<String, Value> =
            serde_json::from_str(&json).map_err(|e| SearchError::parse(e.to_string()))?;
        let mut record = IndexedRecord::new(fields);

        let package_id = record.id().unwrap_or(id).to_string();
        let tags: Vec<String> = sqlx::query_scalar(
            "SELECT t.name FROM tag t JOIN package_tag pt ON pt.tag_id = t.id \
             WHERE pt.package_id = $1 AND pt.state = 'active' ORDER BY t.name",
        )
        .bind(package_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        record.insert("tags", tags);

        debug!(id = %package_id, "Fetched package from store");
        Ok(record)
    }

    async fn enumerate_ids(
        &self,
        entity_type: &EntityType,
        scope: IdScope,
    ) -> Result<Vec<String>, SearchError> {
        Self::ensure_package(entity_type)?;

        let sql = match scope {
            IdScope::NotDeleted => "SELECT id FROM package WHERE state <> 'deleted' ORDER BY id",
            IdScope::Active => "SELECT id FROM package WHERE state = 'active' ORDER BY id",
        };
        let ids: Vec<String> = sqlx::query_scalar(sql).fetch_all(&self.pool).await?;
        Ok(ids)
    }

    async fn summarize(
        &self,
        entity_type: &EntityType,
        id: &str,
    ) -> Result<Option<RecordSummary>, SearchError> {
        Self::ensure_package(entity_type)?;

        let row: Option<(String, String, Option<NaiveDateTime>)> =
            sqlx::query_as("SELECT id, name, metadata_modified FROM package WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, name, modified)| RecordSummary {
            id,
            name,
            metadata_modified: modified.map(|m| m.and_utc()),
        }))
    }

    /// Pooled connections hold no session state between queries, so there is
    /// nothing to release.
    async fn commit(&self) -> Result<(), SearchError> {
        debug!("Store session committed");
        Ok(())
    }
}
