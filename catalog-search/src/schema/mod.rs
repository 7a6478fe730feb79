//! Search engine schema version gate.

use std::path::Path;
use std::sync::Arc;

use catalog_search_repository::{SchemaLocation, SchemaProvider, SearchError};
use catalog_search_shared::SchemaVersion;
use tracing::{info, instrument, warn};

/// Result of a compatibility check that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// The schema carries a supported version.
    Compatible(SchemaVersion),
    /// The engine is unreachable or not configured, so the check does not apply.
    NotApplicable,
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible(_))
    }
}

/// Verifies the engine's schema before documents are written against it.
pub struct SchemaCompatibilityGate {
    provider: Arc<dyn SchemaProvider>,
}

impl SchemaCompatibilityGate {
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self { provider }
    }

    /// Check the schema version of the engine, or of a local schema file.
    ///
    /// A local file is read and parsed without contacting the engine.
    ///
    /// # Returns
    ///
    /// * `Ok(Compatibility::Compatible)` - If the version is supported
    /// * `Ok(Compatibility::NotApplicable)` - If the engine cannot be reached
    /// * `Err(SearchError::SchemaError)` - If the version is missing or unsupported
    /// * `Err(SearchError)` - If the schema could not be retrieved or parsed
    #[instrument(skip(self))]
    pub async fn check_compatibility(
        &self,
        schema_file: Option<&Path>,
    ) -> Result<Compatibility, SearchError> {
        let content = match schema_file {
            Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                SearchError::io(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => {
                if !self.provider.is_available().await {
                    warn!("Problems were found while connecting to the search engine");
                    return Ok(Compatibility::NotApplicable);
                }
                self.fetch_remote().await?
            }
        };

        let version = extract_version(&content, schema_file)?;
        info!(version = %version, "Search engine schema version is supported");
        Ok(Compatibility::Compatible(version))
    }

    async fn fetch_remote(&self) -> Result<String, SearchError> {
        match self.provider.fetch_schema(SchemaLocation::Managed).await {
            Ok(content) => Ok(content),
            Err(e) if e.is_http() => {
                info!(error = %e, "Managed schema unavailable, trying the classic schema file");
                self.provider.fetch_schema(SchemaLocation::Classic).await
            }
            Err(e) => Err(e),
        }
    }
}

/// Read and validate the `version` attribute of the schema's root element.
fn extract_version(
    content: &str,
    schema_file: Option<&Path>,
) -> Result<SchemaVersion, SearchError> {
    let document = roxmltree::Document::parse(content)
        .map_err(|e| SearchError::parse(format!("Invalid schema document: {}", e)))?;

    let version = document
        .root_element()
        .attribute("version")
        .filter(|v| !v.is_empty())
        .map(SchemaVersion::new)
        .ok_or_else(|| {
            let mut msg = "Could not extract version info from the Solr schema".to_string();
            if let Some(path) = schema_file {
                msg.push_str(&format!(", using file {}", path.display()));
            }
            SearchError::schema(msg)
        })?;

    if !version.is_supported() {
        return Err(SearchError::schema(format!(
            "Solr schema version not supported: {}. Supported versions are [{}]",
            version,
            SchemaVersion::supported_list()
        )));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use tokio::sync::Mutex;

    const SCHEMA_29: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<schema name="ckan" version="2.9">
  <fields><field name="id" type="string" indexed="true" stored="true"/></fields>
</schema>"#;

    const SCHEMA_10: &str = r#"<schema name="ckan" version="1.0"></schema>"#;

    const SCHEMA_NO_VERSION: &str = r#"<schema name="ckan"></schema>"#;

    /// Schema provider answering from fixed responses per location.
    struct MockProvider {
        available: bool,
        managed: Result<String, SearchError>,
        classic: Result<String, SearchError>,
        requested: Mutex<Vec<SchemaLocation>>,
    }

    impl MockProvider {
        fn serving(managed: Result<String, SearchError>, classic: Result<String, SearchError>) -> Self {
            Self {
                available: true,
                managed,
                classic,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn managed(content: &str) -> Self {
            Self::serving(
                Ok(content.to_string()),
                Err(SearchError::http(404, "classic")),
            )
        }
    }

    #[async_trait]
    impl SchemaProvider for MockProvider {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn fetch_schema(&self, location: SchemaLocation) -> Result<String, SearchError> {
            self.requested.lock().await.push(location);
            match location {
                SchemaLocation::Managed => self.managed.clone(),
                SchemaLocation::Classic => self.classic.clone(),
            }
        }
    }

    fn gate(provider: MockProvider) -> (SchemaCompatibilityGate, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        (SchemaCompatibilityGate::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_supported_version_is_compatible() {
        let (gate, _) = gate(MockProvider::managed(SCHEMA_29));

        let result = gate.check_compatibility(None).await.unwrap();

        assert_eq!(result, Compatibility::Compatible(SchemaVersion::new("2.9")));
    }

    #[tokio::test]
    async fn test_unsupported_version_lists_supported_set() {
        let (gate, _) = gate(MockProvider::managed(SCHEMA_10));

        let err = gate.check_compatibility(None).await.unwrap_err();

        match err {
            SearchError::SchemaError(msg) => {
                assert!(msg.contains("not supported: 1.0"));
                assert!(msg.contains("[2.8, 2.9]"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_version_is_a_distinct_error() {
        let (gate, _) = gate(MockProvider::managed(SCHEMA_NO_VERSION));

        let err = gate.check_compatibility(None).await.unwrap_err();

        assert!(
            matches!(err, SearchError::SchemaError(ref msg) if msg.starts_with("Could not extract version"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_not_applicable() {
        let mut provider = MockProvider::managed(SCHEMA_10);
        provider.available = false;
        let (gate, provider) = gate(provider);

        let result = gate.check_compatibility(None).await.unwrap();

        assert_eq!(result, Compatibility::NotApplicable);
        assert!(!result.is_compatible());
        assert!(provider.requested.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_http_failure_falls_back_to_classic() {
        let (gate, provider) = gate(MockProvider::serving(
            Err(SearchError::http(404, "managed")),
            Ok(SCHEMA_29.to_string()),
        ));

        assert!(gate.check_compatibility(None).await.unwrap().is_compatible());
        assert_eq!(
            *provider.requested.lock().await,
            vec![SchemaLocation::Managed, SchemaLocation::Classic]
        );
    }

    #[tokio::test]
    async fn test_other_failures_do_not_fall_back() {
        let (gate, provider) = gate(MockProvider::serving(
            Err(SearchError::connection("reset by peer")),
            Ok(SCHEMA_29.to_string()),
        ));

        let err = gate.check_compatibility(None).await.unwrap_err();

        assert!(matches!(err, SearchError::ConnectionError(_)));
        assert_eq!(*provider.requested.lock().await, vec![SchemaLocation::Managed]);
    }

    #[tokio::test]
    async fn test_local_file_bypasses_the_engine() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA_29.as_bytes()).unwrap();
        let mut provider = MockProvider::managed(SCHEMA_10);
        provider.available = false;
        let (gate, provider) = gate(provider);

        let result = gate.check_compatibility(Some(file.path())).await.unwrap();

        assert!(result.is_compatible());
        assert!(provider.requested.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_local_file_without_version_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA_NO_VERSION.as_bytes()).unwrap();
        let (gate, _) = gate(MockProvider::managed(SCHEMA_29));

        let err = gate.check_compatibility(Some(file.path())).await.unwrap_err();

        let expected = format!("using file {}", file.path().display());
        assert!(matches!(err, SearchError::SchemaError(ref msg) if msg.ends_with(&expected)));
    }

    #[test]
    fn test_malformed_document_is_a_parse_error() {
        assert!(matches!(
            extract_version("<schema version=", None).unwrap_err(),
            SearchError::ParseError(_)
        ));
    }
}
