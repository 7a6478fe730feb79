//! Solr provider implementation.
//!
//! Writes go through the JSON update handler (`/update`), reads through the
//! select handler (`/select`). Every document carries `site_id` and
//! `entity_type` so one core can hold several catalogs.

use async_trait::async_trait;
use catalog_search_shared::{EntityType, IndexedRecord};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::SolrSettings;
use crate::errors::SearchError;
use crate::interfaces::{IndexHandle, QueryHandle, SchemaLocation, SchemaProvider};
use crate::solr::query;

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(rename = "numFound")]
    num_found: usize,
    #[serde(default)]
    docs: Vec<Map<String, Value>>,
}

/// Solr provider for one entity type.
///
/// # Example
///
/// ```ignore
/// use catalog_search_repository::{SolrProvider, SolrSettings};
/// use catalog_search_shared::{EntityType, IndexedRecord};
///
/// let settings = SolrSettings::new("http://localhost:8983/solr/ckan");
/// let provider = SolrProvider::new(settings, EntityType::package())?;
///
/// provider.insert(&IndexedRecord::id_only("abc").with("name", "rainfall")).await?;
/// ```
pub struct SolrProvider {
    client: Client,
    settings: SolrSettings,
    entity_type: EntityType,
}

impl SolrProvider {
    /// Create a new Solr provider.
    ///
    /// The URL is not validated here: a misconfigured URL makes the engine
    /// unavailable for schema checks and fails every read and write.
    ///
    /// # Returns
    ///
    /// * `Ok(SolrProvider)` - A new provider instance
    /// * `Err(SearchError)` - If the HTTP client cannot be built
    pub fn new(settings: SolrSettings, entity_type: EntityType) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            url = %settings.base_url(),
            site_id = %settings.site_id,
            entity_type = %entity_type,
            rows_max = settings.rows_max,
            "Created Solr provider"
        );

        Ok(Self {
            client,
            settings,
            entity_type,
        })
    }

    pub fn settings(&self) -> &SolrSettings {
        &self.settings
    }

    /// Full URL for a handler path.
    fn endpoint(&self, offset: &str) -> Result<String, SearchError> {
        let base = self.settings.base_url();
        Url::parse(base)
            .map_err(|e| SearchError::connection(format!("Invalid Solr URL '{}': {}", base, e)))?;
        Ok(format!("{}{}", base, offset))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.settings.credentials() {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    /// Unique key of a record's document.
    fn index_id(&self, id: &str) -> String {
        format!("{}:{}:{}", self.settings.site_id, self.entity_type, id)
    }

    fn scope(&self) -> String {
        query::scope_filter(&self.settings.site_id, self.entity_type.as_str())
    }

    /// Build the engine document for a record.
    fn document(&self, record: &IndexedRecord) -> Result<Value, SearchError> {
        let id = record
            .id()
            .ok_or_else(|| SearchError::index_write("Record has no id"))?;

        let mut doc = record.fields().clone();
        doc.insert("index_id".to_string(), json!(self.index_id(id)));
        doc.insert("site_id".to_string(), json!(self.settings.site_id));
        doc.insert("entity_type".to_string(), json!(self.entity_type.as_str()));
        Ok(Value::Object(doc))
    }

    /// Send a body to the update handler.
    async fn post_update(&self, body: &Value, commit: bool) -> Result<(), SearchError> {
        let url = self.endpoint("/update")?;
        let mut request = self.authorize(self.client.post(&url)).json(body);
        if commit {
            request = request.query(&[("commit", "true")]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Update request failed");
            return Err(SearchError::index_write(format!(
                "Update failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(())
    }

    /// Run a select request.
    async fn select(
        &self,
        filter: &str,
        fields: &str,
        rows: usize,
        start: usize,
    ) -> Result<SelectBody, SearchError> {
        let url = self.endpoint("/select")?;
        let params = [
            ("q", "*:*".to_string()),
            ("fq", filter.to_string()),
            ("fl", fields.to_string()),
            ("rows", rows.to_string()),
            ("start", start.to_string()),
            // Stable order so `start` offsets stay meaningful across pages.
            ("sort", "id asc".to_string()),
            ("wt", "json".to_string()),
        ];

        let response = self
            .authorize(self.client.get(&url))
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Select request failed");
            return Err(SearchError::query(format!(
                "Select failed with status {}: {}",
                status, error_body
            )));
        }

        let parsed: SelectResponse = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        Ok(parsed.response)
    }

    async fn index(&self, record: &IndexedRecord, commit: bool) -> Result<(), SearchError> {
        let doc = self.document(record)?;
        self.post_update(&json!([doc]), commit).await?;
        debug!(id = ?record.id(), commit, "Document indexed");
        Ok(())
    }
}

#[async_trait]
impl IndexHandle for SolrProvider {
    async fn insert(&self, record: &IndexedRecord) -> Result<(), SearchError> {
        self.index(record, true).await
    }

    async fn update(
        &self,
        record: &IndexedRecord,
        defer_commit: bool,
    ) -> Result<(), SearchError> {
        self.index(record, !defer_commit).await
    }

    async fn remove(&self, record: &IndexedRecord) -> Result<(), SearchError> {
        let id = record
            .id()
            .ok_or_else(|| SearchError::index_write("Record has no id"))?;
        let filter = query::reference_filter(&self.scope(), id);

        self.post_update(&json!({ "delete": { "query": filter } }), true)
            .await?;

        debug!(id = %id, "Document removed");
        Ok(())
    }

    /// Removes every document of this site, whatever its entity type.
    async fn clear(&self) -> Result<(), SearchError> {
        let filter = query::site_filter(&self.settings.site_id);
        self.post_update(&json!({ "delete": { "query": filter } }), true)
            .await?;

        info!(site_id = %self.settings.site_id, "Search index cleared");
        Ok(())
    }

    async fn commit(&self) -> Result<(), SearchError> {
        self.post_update(&json!({ "commit": {} }), false).await
    }
}

#[async_trait]
impl QueryHandle for SolrProvider {
    async fn get_all_entity_ids(&self, max_results: usize) -> Result<Vec<String>, SearchError> {
        let scope = self.scope();
        let mut ids = Vec::new();
        let mut start = 0;

        while ids.len() < max_results {
            let rows = self.settings.rows_max.min(max_results - ids.len());
            let page = self.select(&scope, "id", rows, start).await?;
            if page.docs.is_empty() {
                break;
            }

            start += page.docs.len();
            ids.extend(
                page.docs
                    .iter()
                    .filter_map(|doc| doc.get("id").and_then(Value::as_str))
                    .map(str::to_string),
            );

            if start >= page.num_found {
                break;
            }
        }

        debug!(count = ids.len(), "Enumerated indexed ids");
        Ok(ids)
    }

    async fn get_index(&self, reference: &str) -> Result<Option<IndexedRecord>, SearchError> {
        let filter = query::reference_filter(&self.scope(), reference);
        let page = self.select(&filter, "*", 1, 0).await?;
        Ok(page.docs.into_iter().next().map(IndexedRecord::new))
    }
}

#[async_trait]
impl SchemaProvider for SolrProvider {
    async fn is_available(&self) -> bool {
        let url = match self.endpoint("/admin/ping") {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Solr is not configured");
                return false;
            }
        };

        match self
            .authorize(self.client.get(&url))
            .query(&[("wt", "json")])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(status = %response.status(), url = %url, "Solr ping failed");
                false
            }
            Err(e) => {
                warn!(error = %e, url = %url, "Could not connect to Solr");
                false
            }
        }
    }

    async fn fetch_schema(&self, location: SchemaLocation) -> Result<String, SearchError> {
        let url = self.endpoint(location.offset())?;

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::http(status.as_u16(), url));
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SolrProvider {
        let settings = SolrSettings::new("http://localhost:8983/solr/ckan").with_site_id("site-a");
        SolrProvider::new(settings, EntityType::package()).unwrap()
    }

    #[test]
    fn test_index_id() {
        assert_eq!(provider().index_id("abc"), "site-a:package:abc");
    }

    #[test]
    fn test_document_adds_scope_fields() {
        let record = IndexedRecord::id_only("abc").with("name", "rainfall");
        let doc = provider().document(&record).unwrap();

        assert_eq!(doc["id"], "abc");
        assert_eq!(doc["name"], "rainfall");
        assert_eq!(doc["index_id"], "site-a:package:abc");
        assert_eq!(doc["site_id"], "site-a");
        assert_eq!(doc["entity_type"], "package");
    }

    #[test]
    fn test_document_requires_id() {
        let record = IndexedRecord::default().with("name", "rainfall");
        let result = provider().document(&record);
        assert!(matches!(
            result.unwrap_err(),
            SearchError::IndexWriteError(_)
        ));
    }

    #[test]
    fn test_endpoint_rejects_invalid_url() {
        let provider =
            SolrProvider::new(SolrSettings::new("not a url"), EntityType::package()).unwrap();
        assert!(matches!(
            provider.endpoint("/select").unwrap_err(),
            SearchError::ConnectionError(_)
        ));
    }

    #[test]
    fn test_endpoint_joins_offset() {
        assert_eq!(
            provider().endpoint(SchemaLocation::Classic.offset()).unwrap(),
            "http://localhost:8983/solr/ckan/admin/file/?file=schema.xml"
        );
    }
}
