//! Client configuration
//!
//! Identification parameters (`tool`, `email`, `api_key`, `db`) are sent with
//! every request. NCBI asks that callers identify themselves; an API key raises
//! the default ceiling from 3 to 10 requests per second.

use std::time::Duration;

use crate::rate_limit::RateLimiter;

const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_TOOL: &str = "pubmed-harvest";
const DEFAULT_DATABASE: &str = "pubmed";

/// Maximum number of ids a single ESearch call returns
pub const DEFAULT_SEARCH_CAP: usize = 10_000;

/// Default number of ids submitted per EFetch call
pub const DEFAULT_FETCH_BATCH_SIZE: usize = 250;

/// Default per-request network timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`PubMedClient`](crate::PubMedClient)
///
/// # Example
///
/// ```
/// use pubmed_harvest::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_email("researcher@university.edu")
///     .with_tool("my-harvester")
///     .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(config.effective_rate_limit(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// NCBI API key
    pub api_key: Option<String>,
    /// Contact email sent as the `email` parameter
    pub email: Option<String>,
    /// Tool name sent as the `tool` parameter
    pub tool: Option<String>,
    /// Target Entrez database
    pub database: String,
    /// Override for the E-utilities base URL (used by tests against a mock server)
    pub base_url: Option<String>,
    /// Requests admitted per trailing second; `None` picks the NCBI default
    pub rate_limit: Option<usize>,
    /// Per-request network timeout
    pub timeout: Duration,
    /// Server-side cap on ids returned by one search call
    pub search_cap: usize,
    /// Default batch size for record fetches
    pub fetch_batch_size: usize,
    /// Custom User-Agent header
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a configuration with NCBI defaults
    pub fn new() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            database: DEFAULT_DATABASE.to_string(),
            base_url: None,
            rate_limit: None,
            timeout: DEFAULT_TIMEOUT,
            search_cap: DEFAULT_SEARCH_CAP,
            fetch_batch_size: DEFAULT_FETCH_BATCH_SIZE,
            user_agent: None,
        }
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the admission ceiling (requests per trailing second)
    pub fn with_rate_limit(mut self, ceiling: usize) -> Self {
        self.rate_limit = Some(ceiling);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the server id cap. Only useful against servers that enforce a
    /// different limit, or in tests.
    pub fn with_search_cap(mut self, cap: usize) -> Self {
        self.search_cap = cap.max(1);
        self
    }

    pub fn with_fetch_batch_size(mut self, batch_size: usize) -> Self {
        self.fetch_batch_size = batch_size.max(1);
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Ceiling actually used: explicit value, else 10 with an API key, else 3
    pub fn effective_rate_limit(&self) -> usize {
        self.rate_limit
            .unwrap_or(if self.api_key.is_some() { 10 } else { 3 })
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("pubmed-harvest/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    /// Identification parameters appended to every request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }

        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }

        params.push(("tool".to_string(), self.effective_tool().to_string()));

        params
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
