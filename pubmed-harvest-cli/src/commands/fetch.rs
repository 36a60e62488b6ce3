use std::path::PathBuf;
use std::pin::pin;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use pubmed_harvest::PubMedClient;
use pubmed_harvest::config::DEFAULT_FETCH_BATCH_SIZE;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::ids::report;
use super::{open_output, write_json_lines};

#[derive(Args, Debug)]
pub struct Fetch {
    /// PubMed search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Maximum number of records to fetch
    #[arg(
        short,
        long,
        default_value_t = usize::MAX,
        hide_default_value = true,
        conflicts_with = "stream"
    )]
    max_results: usize,

    /// Ids submitted per EFetch request
    #[arg(short, long, default_value_t = DEFAULT_FETCH_BATCH_SIZE)]
    batch_size: usize,

    /// Write each batch as soon as it arrives instead of holding every record
    #[arg(long)]
    stream: bool,

    /// Save records (JSON lines) to file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Fetch {
    pub async fn execute(&self, client: &PubMedClient) -> Result<()> {
        let mut writer = open_output(self.output.as_deref()).await?;

        if self.stream {
            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} records ({msg})")
                    .context("Failed to set progress bar style")?,
            );
            progress.enable_steady_tick(Duration::from_millis(100));
            progress.set_message("resolving ids");

            let mut batches = pin!(client.fetch_all_streaming(&self.query, self.batch_size));
            while let Some(batch) = batches.next().await {
                let records = match batch {
                    Ok(records) => records,
                    Err(e) => {
                        progress.abandon_with_message("failed");
                        return Err(e.into());
                    }
                };
                progress.set_message("fetching");
                progress.inc(records.len() as u64);
                write_json_lines(&mut writer, &records).await?;
            }
            progress.finish_with_message("done");
        } else {
            let resolved = client.resolve_ids(&self.query, self.max_results).await?;
            report(&resolved);

            let records = client.fetch_from_ids(&resolved.ids, self.batch_size).await?;
            info!(records = records.len(), "Fetched records");
            write_json_lines(&mut writer, &records).await?;
        }

        writer.flush().await?;
        Ok(())
    }
}
