pub mod count;
pub mod fetch;
pub mod fetch_ids;
pub mod ids;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use pubmed_harvest::{ClientConfig, PubMedClient};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Identification and transport settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct ClientOptions<'a> {
    pub api_key: Option<&'a str>,
    pub email: Option<&'a str>,
    pub tool: &'a str,
    pub timeout_seconds: Option<u64>,
}

pub fn create_client(options: &ClientOptions<'_>) -> PubMedClient {
    let mut config = ClientConfig::new().with_tool(options.tool);

    if let Some(key) = options.api_key {
        config = config.with_api_key(key);
    }

    if let Some(email) = options.email {
        config = config.with_email(email);
    }

    if let Some(seconds) = options.timeout_seconds {
        config = config.with_timeout(Duration::from_secs(seconds));
    }

    PubMedClient::with_config(config)
}

/// Open `path` for writing, or stdout when no path is given
pub async fn open_output(path: Option<&Path>) -> Result<Box<dyn AsyncWrite + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Write one JSON document per line
pub async fn write_json_lines<W, T>(writer: &mut W, items: &[T]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize,
{
    for item in items {
        let mut line = serde_json::to_vec(item)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    Ok(())
}
