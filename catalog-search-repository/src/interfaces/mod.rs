//! Interface definitions for the search synchronizer's collaborators.
//!
//! These traits allow for dependency injection and swappable backends: the search
//! engine (write, read and schema sides) and the store of record.

mod catalog_store;
mod index_handle;
mod query_handle;
mod schema_provider;

pub use catalog_store::{CatalogStore, DetachedStore, IdScope};
pub use index_handle::{IndexHandle, NoopIndex};
pub use query_handle::QueryHandle;
pub use schema_provider::{SchemaLocation, SchemaProvider};
