//! # Catalog Search Shared
//!
//! This crate defines shared data structures and types used across the catalog
//! search synchronizer. It includes entity type resolution, change notifications,
//! the flattened record handed to the search engine, and schema versions.

pub mod types;

pub use types::change::{ChangeOperation, ChangeScope, ChangeSet};
pub use types::entity::{DomainEntity, EntityKind, EntityState, EntityType, Package};
pub use types::indexed_record::{IndexedRecord, RecordSummary};
pub use types::schema_version::{SchemaVersion, SUPPORTED_SCHEMA_VERSIONS};
