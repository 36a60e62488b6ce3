use anyhow::Result;
use clap::Args;
use pubmed_harvest::PubMedClient;

#[derive(Args, Debug)]
pub struct Count {
    /// PubMed search query
    #[arg(value_name = "QUERY")]
    query: String,
}

impl Count {
    pub async fn execute(&self, client: &PubMedClient) -> Result<()> {
        let count = client.total_count(&self.query).await?;
        println!("{}", count);
        Ok(())
    }
}
