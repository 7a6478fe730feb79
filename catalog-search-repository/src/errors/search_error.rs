//! Search error types.
//!
//! This module defines the unified error type for index writes, index reads,
//! schema checks and store-of-record access.

use thiserror::Error;

/// Unified errors from search synchronization operations.
///
/// Used by every handle trait and by the core. Which variants are absorbed and
/// which propagate is decided by the caller: unknown types on the write path
/// never reach this type at all, while everything listed here is a failure the
/// caller has to see.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The search engine rejected or failed a write.
    #[error("Index write error: {0}")]
    IndexWriteError(String),

    /// An entity type with no registered query handle was asked for.
    #[error("Unknown search type: {0}")]
    UnknownType(String),

    /// The engine's schema version is missing or not supported.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// The search engine or the store of record could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The engine answered an HTTP request with a non-success status.
    #[error("HTTP error {status} from {url}")]
    HttpError { status: u16, url: String },

    /// A read query against the engine failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A response or document could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The store of record failed.
    #[error("Store error: {0}")]
    StoreError(String),

    /// A single record failed during a bulk rebuild.
    #[error("Error while indexing record {id}: {message}")]
    RebuildError { id: String, message: String },

    /// A record is not present in the store of record.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Local file access failed.
    #[error("IO error: {0}")]
    IoError(String),
}

impl SearchError {
    /// Create an index write error.
    pub fn index_write(msg: impl Into<String>) -> Self {
        Self::IndexWriteError(msg.into())
    }

    /// Create an unknown type error.
    pub fn unknown_type(entity_type: impl Into<String>) -> Self {
        Self::UnknownType(entity_type.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            url: url.into(),
        }
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Create a per-record rebuild error.
    pub fn rebuild(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::RebuildError {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(reference: impl Into<String>) -> Self {
        Self::NotFound(reference.into())
    }

    /// Create an IO error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Whether this is an HTTP-level failure (the engine answered, with an error status).
    pub fn is_http(&self) -> bool {
        matches!(self, Self::HttpError { .. })
    }
}

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<sqlx::Error> for SearchError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_error_names_the_record() {
        let err = SearchError::rebuild("abc", "boom");
        assert_eq!(err.to_string(), "Error while indexing record abc: boom");
    }

    #[test]
    fn test_is_http() {
        assert!(SearchError::http(404, "http://solr/schema").is_http());
        assert!(!SearchError::connection("refused").is_http());
    }
}
