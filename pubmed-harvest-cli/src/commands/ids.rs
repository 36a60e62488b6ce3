use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubmed_harvest::{DateBound, DateWindow, PubMedClient, ResolvedIds};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::open_output;

#[derive(Args, Debug)]
pub struct Ids {
    /// PubMed search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Maximum number of ids to resolve
    #[arg(short, long, default_value_t = usize::MAX, hide_default_value = true)]
    max_results: usize,

    /// Earliest publication date searched (YYYY[/MM[/DD]])
    #[arg(long)]
    min_date: Option<String>,

    /// Latest publication date searched (YYYY[/MM[/DD]])
    #[arg(long)]
    max_date: Option<String>,

    /// Take whatever one search returns instead of splitting date ranges
    #[arg(long, conflicts_with_all = ["min_date", "max_date"])]
    first: bool,

    /// Print a JSON summary (ids, total count, warnings) instead of one id per line
    #[arg(long)]
    json: bool,

    /// Save results to file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Ids {
    pub async fn execute(&self, client: &PubMedClient) -> Result<()> {
        let resolved = if self.first {
            client
                .resolve_first_ids(&self.query, self.max_results)
                .await?
        } else {
            client
                .resolve_ids_in(&self.query, self.max_results, self.window()?)
                .await?
        };

        report(&resolved);

        let content = if self.json {
            serde_json::to_string_pretty(&resolved)?
        } else {
            resolved.ids.join("\n")
        };

        let mut writer = open_output(self.output.as_deref()).await?;
        writer.write_all(content.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    fn window(&self) -> Result<DateWindow> {
        let default = DateWindow::default();

        let min = match &self.min_date {
            Some(date) => DateBound::parse_lower(date).context("Invalid --min-date")?,
            None => default.min(),
        };
        let max = match &self.max_date {
            Some(date) => DateBound::parse_upper(date).context("Invalid --max-date")?,
            None => default.max(),
        };

        Ok(DateWindow::new(min, max)?)
    }
}

/// Log the resolution summary and every retrieval warning to stderr
pub fn report(resolved: &ResolvedIds) {
    info!(
        ids = resolved.len(),
        total_count = resolved.total_count,
        search_requests = resolved.search_requests,
        "Resolved ids"
    );
    for warning in &resolved.warnings {
        warn!("{}", warning);
    }
}
