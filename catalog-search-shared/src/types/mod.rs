//! This module defines the core data structures and types used across the catalog
//! search synchronizer.

pub mod change;
pub mod entity;
pub mod indexed_record;
pub mod schema_version;
