//! `PubMedClient`: the query orchestrator
//!
//! The client owns the HTTP connection pool, the configuration and the rate
//! limiter. Every outbound call goes through [`PubMedClient::make_request`],
//! which waits for a rate limiter slot and sends the request.
//!
//! - `partition` - id resolution with recursive date-window splitting
//! - `fetch` - EFetch batches and the batched/aligned fetch operations
//! - `stream` - batch-at-a-time retrieval as a `Stream`

mod fetch;
mod partition;
mod stream;

use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::{Record, ResolvedIds, RetrievalWarning};
use crate::pubmed::responses::{ESearchData, ESearchResult};
use crate::pubmed::window::DateWindow;
use crate::rate_limit::RateLimiter;

/// Client for bounded PubMed retrieval
///
/// Cloning is cheap; clones share the connection pool and the rate limiter.
#[derive(Clone, Debug)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a client with default configuration (3 requests/second, no API key)
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_harvest::PubMedClient;
    ///
    /// let client = PubMedClient::new();
    /// assert_eq!(client.rate_limiter().ceiling(), 3);
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_harvest::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    ///
    /// let client = PubMedClient::with_config(config);
    /// assert_eq!(client.rate_limiter().ceiling(), 10);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build configured HTTP client, using defaults");
                Client::new()
            });

        Self::with_client(client, config)
    }

    /// Create a client around a preconfigured `reqwest::Client`
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            config,
        }
    }

    /// Replace the rate limiter, e.g. to share one between clients or to
    /// drive it from a manual clock
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Total number of records matching `query`
    ///
    /// Issues one search with `retmax=1`, so the server cap plays no role.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_harvest::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let count = client.total_count("crispr[tiab]").await?;
    ///     println!("{} matches", count);
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query))]
    pub async fn total_count(&self, query: &str) -> Result<usize> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning zero");
            return Ok(0);
        }

        let data = self.esearch(query, 1, None).await?;
        let count = data.total_count()?;
        info!(count, "Count lookup completed");
        Ok(count)
    }

    /// Resolve `query` to its id list over the default date window
    /// (1000/01/01 through 3000/12/31)
    ///
    /// At most `max_results` ids are returned. When the match count exceeds
    /// what one search can return, the date window is split recursively and
    /// the per-window lists are concatenated in window order. Anything that
    /// makes the list differ from the true match set is reported in
    /// [`ResolvedIds::warnings`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_harvest::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let resolved = client.resolve_ids("sars-cov-2", 50_000).await?;
    ///
    ///     println!("{} of {} ids", resolved.len(), resolved.total_count);
    ///     for warning in &resolved.warnings {
    ///         eprintln!("warning: {}", warning);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn resolve_ids(&self, query: &str, max_results: usize) -> Result<ResolvedIds> {
        self.resolve_ids_in(query, max_results, DateWindow::default())
            .await
    }

    /// Resolve `query` restricted to `window`
    #[instrument(skip(self), fields(query = %query, max_results = max_results, window = %window))]
    pub async fn resolve_ids_in(
        &self,
        query: &str,
        max_results: usize,
        window: DateWindow,
    ) -> Result<ResolvedIds> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(ResolvedIds::default());
        }

        let resolved = self.partition(query, max_results, window).await?;
        info!(
            ids = resolved.len(),
            total_count = resolved.total_count,
            search_requests = resolved.search_requests,
            warnings = resolved.warnings.len(),
            "Id resolution completed"
        );
        Ok(resolved)
    }

    /// The first ids one search returns for `query`, without partitioning
    ///
    /// Issues exactly one search asking for `min(max_results, search_cap)`
    /// ids. When more records match than came back, the result carries a
    /// [`RetrievalWarning::Truncated`] warning. Use this when any
    /// `max_results` matches will do; [`PubMedClient::resolve_ids`] walks
    /// the date window instead.
    #[instrument(skip(self), fields(query = %query, max_results = max_results))]
    pub async fn resolve_first_ids(&self, query: &str, max_results: usize) -> Result<ResolvedIds> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(ResolvedIds::default());
        }

        let retmax = max_results.min(self.config.search_cap);
        let mut data = self.esearch(query, retmax, None).await?;
        let total_count = data.total_count()?;
        let ids = data.take_ids()?;

        let mut warnings = Vec::new();
        if total_count > ids.len() {
            warn!(available = total_count, limit = ids.len(), "Returning the first ids only");
            warnings.push(RetrievalWarning::Truncated {
                available: total_count,
                limit: ids.len(),
            });
        }

        info!(ids = ids.len(), total_count, "Single search completed");
        Ok(ResolvedIds {
            ids,
            total_count,
            search_requests: 1,
            warnings,
        })
    }

    /// Resolve ids for `query` and fetch their records in batches of the
    /// configured fetch batch size
    ///
    /// Retrieval warnings are logged; use [`PubMedClient::resolve_ids`]
    /// followed by [`PubMedClient::fetch_from_ids`] to inspect them.
    #[instrument(skip(self), fields(query = %query, max_results = max_results))]
    pub async fn fetch_all(&self, query: &str, max_results: usize) -> Result<Vec<Record>> {
        let resolved = self.resolve_ids(query, max_results).await?;
        self.fetch_from_ids(&resolved.ids, self.config.fetch_batch_size)
            .await
    }

    /// One ESearch call; the window, when given, becomes `mindate`/`maxdate`
    pub(crate) async fn esearch(
        &self,
        query: &str,
        retmax: usize,
        window: Option<&DateWindow>,
    ) -> Result<ESearchData> {
        let mut params = vec![
            ("term", query.to_string()),
            ("retmax", retmax.to_string()),
            ("retmode", "json".to_string()),
        ];
        if let Some(window) = window {
            params.push(("mindate", window.min().to_pubmed_string()));
            params.push(("maxdate", window.max().to_pubmed_string()));
        }

        let response = self.make_request("esearch.fcgi", &params).await?;
        let body = response.text().await?;
        let result: ESearchResult = serde_json::from_str(&body)?;

        // NCBI sometimes answers 200 OK with an ERROR field
        if let Some(message) = result.esearchresult.error {
            return Err(PubMedError::ApiError {
                status: 200,
                message: format!("NCBI ESearch API error: {}", message),
            });
        }

        Ok(result.esearchresult)
    }

    /// Full request URL: endpoint parameters, then `db` and the
    /// identification parameters
    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let database = [("db".to_string(), self.config.database.clone())];
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .chain(
                database
                    .into_iter()
                    .chain(self.config.build_api_params())
                    .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value))),
            )
            .collect::<Vec<_>>()
            .join("&");

        format!("{}/{}?{}", self.base_url, endpoint, query)
    }

    /// Send a GET request under the rate limiter
    ///
    /// The rate limiter slot is taken at admission, so a request counts
    /// against the budget whatever its outcome. Non-success statuses become
    /// [`PubMedError::ApiError`]; nothing is retried.
    pub(crate) async fn make_request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Response> {
        let url = self.build_url(endpoint, params);

        self.rate_limiter.acquire().await;
        debug!(url = %url, "Making API request");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint, "API request failed");
            return Err(PubMedError::ApiError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        Ok(response)
    }
}

impl Default for PubMedClient {
    fn default() -> Self {
        Self::new()
    }
}
