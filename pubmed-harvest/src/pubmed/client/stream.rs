//! Batch-at-a-time retrieval

use futures_util::{Stream, stream};
use tracing::debug;

use crate::error::{PubMedError, Result};
use crate::pubmed::models::Record;

use super::PubMedClient;

/// State machine behind [`PubMedClient::fetch_all_streaming`]
enum StreamState {
    /// Ids not resolved yet
    Resolving { query: String, batch_size: usize },
    /// Ids resolved; `offset` is the first id of the next batch
    Fetching {
        ids: Vec<String>,
        batch_size: usize,
        offset: usize,
    },
    /// Exhausted or failed
    Done,
}

impl PubMedClient {
    /// Resolve every id for `query`, then yield the records of one batch at
    /// a time
    ///
    /// Nothing is requested until the stream is first polled. Only the id list
    /// and the current batch are held in memory. The stream ends after the
    /// last batch or after the first error. It cannot be resumed: calling this
    /// again resolves the ids from scratch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_harvest::PubMedClient;
    /// use futures_util::StreamExt;
    /// use std::pin::pin;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let mut batches = pin!(client.fetch_all_streaming("cancer biomarker", 250));
    ///
    ///     while let Some(batch) = batches.next().await {
    ///         for record in batch? {
    ///             println!("{}: {}", record.pmid(), record.title());
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn fetch_all_streaming(
        &self,
        query: &str,
        batch_size: usize,
    ) -> impl Stream<Item = Result<Vec<Record>>> + '_ {
        let initial = StreamState::Resolving {
            query: query.to_string(),
            batch_size,
        };

        stream::unfold(initial, move |state| async move {
            let (ids, batch_size, offset) = match state {
                StreamState::Resolving { query, batch_size } => {
                    if batch_size == 0 {
                        return Some((Err(PubMedError::InvalidBatchSize), StreamState::Done));
                    }
                    match self.resolve_ids(&query, usize::MAX).await {
                        Ok(resolved) => (resolved.ids, batch_size, 0),
                        Err(e) => return Some((Err(e), StreamState::Done)),
                    }
                }
                StreamState::Fetching {
                    ids,
                    batch_size,
                    offset,
                } => (ids, batch_size, offset),
                StreamState::Done => return None,
            };

            if offset >= ids.len() {
                debug!(total = ids.len(), "Streaming fetch exhausted");
                return None;
            }

            let end = (offset + batch_size).min(ids.len());
            match self.fetch_records(&ids[offset..end]).await {
                Ok(records) => Some((
                    Ok(records),
                    StreamState::Fetching {
                        ids,
                        batch_size,
                        offset: end,
                    },
                )),
                Err(e) => Some((Err(e), StreamState::Done)),
            }
        })
    }
}
