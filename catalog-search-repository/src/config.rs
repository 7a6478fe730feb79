//! Configuration types for the Solr adapter.

use std::time::Duration;

/// Default number of rows requested from the engine per page.
pub const DEFAULT_ROWS_MAX: usize = 1000;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default site identifier scoping this catalog's documents.
pub const DEFAULT_SITE_ID: &str = "default";

/// Connection settings for the Solr search engine.
///
/// Basic auth is only sent when both `user` and `password` are set.
#[derive(Debug, Clone)]
pub struct SolrSettings {
    /// Core URL, e.g. `http://localhost:8983/solr/ckan`.
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Identifies this catalog instance inside a shared index.
    pub site_id: String,
    /// Row-limit cap for a single engine request.
    pub rows_max: usize,
    pub timeout: Duration,
}

impl SolrSettings {
    /// Create settings for the given core URL with defaults for everything else.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
            site_id: DEFAULT_SITE_ID.to_string(),
            rows_max: DEFAULT_ROWS_MAX,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set basic auth credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = site_id.into();
        self
    }

    /// Set the row-limit cap. A cap of zero is raised to one.
    pub fn with_rows_max(mut self, rows_max: usize) -> Self {
        self.rows_max = rows_max.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// The URL with trailing slashes removed, ready for offsets to be appended.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
