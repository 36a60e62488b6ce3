use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::ClientOptions;

#[derive(Parser)]
#[command(
    name = "pubmed-harvest",
    about = "Bulk retrieval of PubMed records",
    long_about = "Resolve PubMed queries to complete id lists, splitting date ranges \
                  to get past the 10,000 result cap, and fetch the matching records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for NCBI E-utilities (increases rate limit)
    #[arg(long, env = "NCBI_API_KEY", global = true)]
    api_key: Option<String>,

    /// Email for NCBI requests (recommended)
    #[arg(long, env = "NCBI_EMAIL", global = true)]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, env = "NCBI_TOOL", default_value = "pubmed-harvest", global = true)]
    tool: String,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of records matching a query
    Count(commands::count::Count),
    /// Resolve a query to its PMIDs
    Ids(commands::ids::Ids),
    /// Resolve a query and fetch every matching record
    Fetch(commands::fetch::Fetch),
    /// Fetch records for known PMIDs
    #[command(name = "fetch-ids")]
    FetchIds(commands::fetch_ids::FetchIds),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let client = commands::create_client(&ClientOptions {
        api_key: cli.api_key.as_deref(),
        email: cli.email.as_deref(),
        tool: &cli.tool,
        timeout_seconds: cli.timeout,
    });

    match &cli.command {
        Commands::Count(cmd) => cmd.execute(&client).await,
        Commands::Ids(cmd) => cmd.execute(&client).await,
        Commands::Fetch(cmd) => cmd.execute(&client).await,
        Commands::FetchIds(cmd) => cmd.execute(&client).await,
    }
}
