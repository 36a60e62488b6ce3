//! PubMed search, id resolution and record retrieval
//!
//! - [`client`] - `PubMedClient` and its operations
//! - [`window`] - date windows and their splitting
//! - [`models`] - records and retrieval diagnostics
//! - [`parser`] - EFetch XML decoding

pub mod client;
pub mod models;
pub mod parser;
pub(crate) mod responses;
pub mod window;

pub use client::PubMedClient;
pub use models::{PubMedArticle, PubMedBookArticle, Record, ResolvedIds, RetrievalWarning};
pub use parser::parse_records_from_xml;
pub use window::{DateBound, DateWindow, Granularity, WindowSplit};
