//! PostgreSQL implementation of the store of record.

mod catalog_store;

pub use catalog_store::PostgresCatalogStore;
