//! Access to the search engine's schema document.

use async_trait::async_trait;

use crate::errors::SearchError;

/// Where the engine exposes its schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaLocation {
    /// Schema API of an engine running with a managed schema.
    Managed,
    /// Raw `schema.xml` of an engine running with a hand-edited schema.
    Classic,
}

impl SchemaLocation {
    /// Path appended to the engine base URL.
    pub fn offset(&self) -> &'static str {
        match self {
            Self::Managed => "/schema?wt=schema.xml",
            Self::Classic => "/admin/file/?file=schema.xml",
        }
    }
}

/// Abstracts retrieval of the engine's schema for the compatibility gate.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Whether the engine is configured and reachable.
    ///
    /// Misconfiguration and transport failures both report `false`; this never errors.
    async fn is_available(&self) -> bool;

    /// Fetch the raw schema document from the given location.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The schema document body
    /// * `Err(SearchError::HttpError)` - If the engine answered with an error status
    /// * `Err(SearchError)` - For any other failure
    async fn fetch_schema(&self, location: SchemaLocation) -> Result<String, SearchError>;
}
