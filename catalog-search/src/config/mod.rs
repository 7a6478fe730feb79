//! Settings and dependency wiring.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::time::Duration;

use catalog_search_repository::config::{DEFAULT_ROWS_MAX, DEFAULT_SITE_ID, DEFAULT_TIMEOUT_SECS};
use catalog_search_repository::SolrSettings;
use tracing::warn;

use crate::observer::AutoIndexConfig;

/// Default Solr core URL.
const DEFAULT_SOLR_URL: &str = "http://localhost:8983/solr/ckan";

/// Runtime settings for the synchronizer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub solr: SolrSettings,
    /// Store of record connection string. Only required by operations that read it.
    pub database_url: Option<String>,
    pub auto_index: AutoIndexConfig,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SOLR_URL`: Solr core URL (default: http://localhost:8983/solr/ckan)
    /// - `SOLR_USER` / `SOLR_PASSWORD`: Basic auth credentials, used only when both are set
    /// - `SOLR_TIMEOUT_SECS`: HTTP timeout in seconds (default: 60)
    /// - `CATALOG_SITE_ID`: Site id scoping this catalog's documents (default: "default")
    /// - `SEARCH_AUTOMATIC_INDEXING`: Index changes on store commit (default: true)
    /// - `SEARCH_ROWS_MAX`: Row cap per engine request (default: 1000)
    /// - `DATABASE_URL`: Store of record connection string
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("SOLR_URL").unwrap_or_else(|| DEFAULT_SOLR_URL.to_string());
        let timeout = parse_or("SOLR_TIMEOUT_SECS", get("SOLR_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS);
        let rows_max = parse_or("SEARCH_ROWS_MAX", get("SEARCH_ROWS_MAX"), DEFAULT_ROWS_MAX);
        let site_id = get("CATALOG_SITE_ID").unwrap_or_else(|| DEFAULT_SITE_ID.to_string());

        let mut solr = SolrSettings::new(url)
            .with_site_id(site_id)
            .with_rows_max(rows_max)
            .with_timeout(Duration::from_secs(timeout));
        if let (Some(user), Some(password)) = (get("SOLR_USER"), get("SOLR_PASSWORD")) {
            solr = solr.with_credentials(user, password);
        }

        let automatic_indexing = match get("SEARCH_AUTOMATIC_INDEXING") {
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!(value = %value, "Invalid SEARCH_AUTOMATIC_INDEXING, defaulting to true");
                true
            }),
            None => true,
        };

        Self {
            solr,
            database_url: get("DATABASE_URL"),
            auto_index: AutoIndexConfig { automatic_indexing },
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    value: Option<String>,
    default: T,
) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, default = %default, "Invalid number, using default");
            default
        }),
        None => default,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
