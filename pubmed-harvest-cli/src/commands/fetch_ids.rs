use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use pubmed_harvest::config::DEFAULT_FETCH_BATCH_SIZE;
use pubmed_harvest::{PubMedClient, Record};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{open_output, write_json_lines};

#[derive(Args, Debug)]
pub struct FetchIds {
    /// PMIDs to fetch
    #[arg(value_name = "PMID", required_unless_present = "input")]
    pmids: Vec<String>,

    /// Read PMIDs from a file, one per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Ids submitted per EFetch request
    #[arg(short, long, default_value_t = DEFAULT_FETCH_BATCH_SIZE)]
    batch_size: usize,

    /// Emit one line per input id, with `record: null` for ids the server did not return
    #[arg(long)]
    aligned: bool,

    /// Save records (JSON lines) to file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct AlignedLine<'a> {
    pmid: &'a str,
    record: Option<&'a Record>,
}

impl FetchIds {
    pub async fn execute(&self, client: &PubMedClient) -> Result<()> {
        let pmids = self.collect_pmids().await?;
        if pmids.is_empty() {
            bail!("No PMIDs given");
        }

        let mut writer = open_output(self.output.as_deref()).await?;

        if self.aligned {
            let aligned = client
                .fetch_from_ids_aligned(&pmids, self.batch_size)
                .await?;
            let missing = aligned.iter().filter(|(_, record)| record.is_none()).count();
            info!(requested = aligned.len(), missing, "Fetched records");

            let lines: Vec<AlignedLine<'_>> = aligned
                .iter()
                .map(|(pmid, record)| AlignedLine {
                    pmid,
                    record: record.as_ref(),
                })
                .collect();
            write_json_lines(&mut writer, &lines).await?;
        } else {
            let records = client.fetch_from_ids(&pmids, self.batch_size).await?;
            info!(requested = pmids.len(), fetched = records.len(), "Fetched records");
            write_json_lines(&mut writer, &records).await?;
        }

        writer.flush().await?;
        Ok(())
    }

    async fn collect_pmids(&self) -> Result<Vec<String>> {
        let mut pmids = self.pmids.clone();

        if let Some(path) = &self.input {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            pmids.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }

        Ok(pmids)
    }
}
