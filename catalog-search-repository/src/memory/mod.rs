//! In-memory implementations of the search index and the store of record.
//!
//! These hold everything in process and are used for tests, local runs and
//! dry runs of bulk operations. Both support failure injection for exercising
//! partial-failure paths.

mod index;
mod store;

pub use index::{IndexCall, MemoryIndex};
pub use store::MemoryCatalogStore;
