//! Solr implementation of the index, query and schema handles.
//!
//! This module provides a concrete implementation of `IndexHandle`, `QueryHandle`
//! and `SchemaProvider` over Solr's JSON update and select APIs.

mod provider;
mod query;

pub use provider::SolrProvider;
pub use query::quote;
