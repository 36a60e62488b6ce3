//! # PubMed Harvest
//!
//! Bulk retrieval of PubMed search results past the E-utilities limit of
//! 10,000 ids per search.
//!
//! ## Features
//!
//! - **Id resolution**: a query whose match count exceeds the per-search cap
//!   is split into date windows (years, then months, then days) until every
//!   window fits, and the per-window id lists are concatenated
//! - **Diagnostics**: ids the splitting cannot reach, duplicates at window
//!   boundaries and truncation are reported as [`RetrievalWarning`]s
//! - **Batched fetching**: records are fetched through EFetch in fixed-size
//!   batches, either all at once or as a stream of batches
//! - **Rate limiting**: every request passes a sliding-window limiter that
//!   keeps the client within NCBI's requests-per-second policy
//!
//! ## Quick Start
//!
//! ```no_run
//! use pubmed_harvest::PubMedClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::new();
//!
//!     let total = client.total_count("influenza vaccine").await?;
//!     let resolved = client.resolve_ids("influenza vaccine", 25_000).await?;
//!     println!("resolved {} of {} ids", resolved.len(), total);
//!
//!     let records = client.fetch_from_ids(&resolved.ids[..resolved.len().min(10)], 250).await?;
//!     for record in records {
//!         println!("{}: {}", record.pmid(), record.title());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limiting
//!
//! The client admits 3 requests per second by default, 10 when an API key is
//! configured:
//!
//! ```
//! use pubmed_harvest::{ClientConfig, PubMedClient};
//!
//! let config = ClientConfig::new()
//!     .with_api_key("your_api_key_here")
//!     .with_email("researcher@university.edu")
//!     .with_tool("my-harvester");
//!
//! let client = PubMedClient::with_config(config);
//! assert_eq!(client.rate_limiter().ceiling(), 10);
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod pubmed;
pub mod rate_limit;
pub mod time;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{PubMedError, Result};
pub use pubmed::{
    DateBound, DateWindow, Granularity, PubMedArticle, PubMedBookArticle, PubMedClient, Record,
    ResolvedIds, RetrievalWarning, WindowSplit,
};
pub use rate_limit::RateLimiter;
