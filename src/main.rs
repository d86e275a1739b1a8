use adolens::cli::Cli;
use adolens::output;
use anyhow::Result;
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting AdoLens - Azure Pipelines Build Inspector");
    cli.execute().await?;

    Ok(())
}
