//! # Catalog Search Repository
//!
//! This crate provides the collaborator contracts of the catalog search
//! synchronizer and their implementations: write, read and schema handles on
//! the search engine (Solr, in-memory), and the store of record (PostgreSQL,
//! in-memory).

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;
pub mod solr;

pub use config::SolrSettings;
pub use errors::SearchError;
pub use interfaces::{
    CatalogStore, DetachedStore, IdScope, IndexHandle, NoopIndex, QueryHandle, SchemaLocation,
    SchemaProvider,
};
pub use memory::{IndexCall, MemoryCatalogStore, MemoryIndex};
pub use postgres::PostgresCatalogStore;
pub use solr::SolrProvider;
