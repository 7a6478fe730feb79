//! # Catalog Search
//!
//! Keeps the catalog's search index consistent with the relational store of
//! record.
//!
//! ## Architecture
//!
//! Incremental path: store commit → [`observer::ChangeFeed`] →
//! [`observer::AutoIndexObserver`] (filter, re-fetch) →
//! [`dispatcher::ChangeDispatcher`] → index handle → search engine.
//!
//! Bulk path: operator → [`bulk::BulkIndexEngine`] → query handle (diffing) and
//! index handle (writes) → search engine.
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency wiring
//! - [`dispatcher`]: Type registries and change dispatch
//! - [`observer`]: Automatic indexing on store commits
//! - [`bulk`]: Rebuild, check and clear operations
//! - [`schema`]: Search engine schema version gate

pub mod bulk;
pub mod config;
pub mod dispatcher;
pub mod observer;
pub mod schema;

pub use bulk::{
    BulkIndexEngine, CheckReport, RebuildOptions, RebuildOutcome, RebuildSelector, RebuildSummary,
};
pub use config::{Dependencies, Settings};
pub use dispatcher::{ChangeDispatcher, IndexRegistry, QueryRegistry};
pub use observer::{AutoIndexConfig, AutoIndexObserver, ChangeFeed, ChangeListener};
pub use schema::{Compatibility, SchemaCompatibilityGate};

use catalog_search_repository::SearchError;
use thiserror::Error;

/// Errors that can occur during initialization or execution of an operation.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search synchronization error.
    #[error(transparent)]
    SearchError(#[from] SearchError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
