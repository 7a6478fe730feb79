//! Search engine schema versions understood by this synchronizer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Schema versions the indexing code writes documents for.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["2.8", "2.9"];

/// Version string read from the root element of the engine's schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_SCHEMA_VERSIONS.contains(&self.0.as_str())
    }

    /// The allow-list rendered for messages, e.g. `2.8, 2.9`.
    pub fn supported_list() -> String {
        SUPPORTED_SCHEMA_VERSIONS.join(", ")
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
