use anyhow::Result;
use clap::Parser;

use iptv_italy::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Args::parse().run().await
}
