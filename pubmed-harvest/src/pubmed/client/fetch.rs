//! Record retrieval via EFetch

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::common::PubMedId;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::Record;
use crate::pubmed::parser::parse_records_from_xml;

use super::PubMedClient;

impl PubMedClient {
    /// Fetch one batch of records in a single EFetch call
    ///
    /// All ids are validated before anything is sent. Records come back in
    /// payload order (journal articles, then books), not in `ids` order, and
    /// ids unknown to the server are simply absent.
    #[instrument(skip(self, ids), fields(ids_count = ids.len()))]
    pub async fn fetch_records<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Record>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = PubMedId::parse_all(ids)?
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let params = [
            ("id", id_list),
            ("retmode", "xml".to_string()),
            ("rettype", "abstract".to_string()),
        ];

        debug!(batch_size = ids.len(), "Making EFetch API request");
        let response = self.make_request("efetch.fcgi", &params).await?;
        let xml = response.text().await?;

        if xml.trim().is_empty() {
            debug!("EFetch returned an empty body");
            return Ok(Vec::new());
        }

        let records = parse_records_from_xml(&xml)?;
        info!(
            requested = ids.len(),
            parsed = records.len(),
            "Batch fetch completed"
        );
        Ok(records)
    }

    /// Fetch records for ids the caller already holds, `batch_size` ids per
    /// request
    ///
    /// The result is the concatenation of each batch's records. The chunk
    /// size changes how many requests are made, not which records come back.
    ///
    /// # Errors
    ///
    /// * `PubMedError::InvalidBatchSize` - `batch_size` is zero
    /// * `PubMedError::InvalidPmid` - an id is not a positive integer
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_harvest::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let records = client
    ///         .fetch_from_ids(&["31978945", "33515491", "20301295"], 250)
    ///         .await?;
    ///     for record in &records {
    ///         println!("{}: {}", record.pmid(), record.title());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, ids), fields(ids_count = ids.len()))]
    pub async fn fetch_from_ids<S: AsRef<str>>(
        &self,
        ids: &[S],
        batch_size: usize,
    ) -> Result<Vec<Record>> {
        if batch_size == 0 {
            return Err(PubMedError::InvalidBatchSize);
        }
        PubMedId::parse_all(ids)?;

        let mut records = Vec::with_capacity(ids.len());
        for (index, chunk) in ids.chunks(batch_size).enumerate() {
            debug!(batch = index, size = chunk.len(), "Fetching batch");
            records.extend(self.fetch_records(chunk).await?);
        }

        info!(
            requested = ids.len(),
            fetched = records.len(),
            "Fetch from ids completed"
        );
        Ok(records)
    }

    /// Like [`PubMedClient::fetch_from_ids`], but aligned to the input:
    /// one entry per input id, in input order, paired with its record or
    /// `None` when the server returned nothing for it
    pub async fn fetch_from_ids_aligned<S: AsRef<str>>(
        &self,
        ids: &[S],
        batch_size: usize,
    ) -> Result<Vec<(String, Option<Record>)>> {
        let records = self.fetch_from_ids(ids, batch_size).await?;

        let by_pmid: HashMap<&str, &Record> =
            records.iter().map(|record| (record.pmid(), record)).collect();

        Ok(ids
            .iter()
            .map(|id| {
                let id = id.as_ref().trim();
                (id.to_string(), by_pmid.get(id).map(|&record| record.clone()))
            })
            .collect())
    }
}
