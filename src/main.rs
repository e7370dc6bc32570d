use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    locus_cli::cli::app::run().await
}
