use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::channel::Registry;

mod build;
mod check;
mod list_channels;
mod serve;

pub use build::BuildCommand;
pub use check::CheckCommand;
pub use list_channels::ListChannelsCommand;
pub use serve::ServeCommand;

#[derive(Parser, Debug)]
#[command(name = "iptv-italy")]
#[command(about = "M3U playlist generator and redirect proxy for Italian TV channels")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the playlist file (default)
    Build(BuildCommand),
    /// Start the redirect proxy server
    Serve(ServeCommand),
    /// List the registry channels and exit
    ListChannels(ListChannelsCommand),
    /// Resolve a single channel and print its stream URL
    Check(CheckCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        init_tracing();

        let command = self
            .command
            .unwrap_or(Command::Build(BuildCommand::default()));

        match command {
            Command::Build(cmd) => cmd.run().await,
            Command::Serve(cmd) => cmd.run().await,
            Command::ListChannels(cmd) => cmd.run().await,
            Command::Check(cmd) => cmd.run().await,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Load the registry from `path`, or the embedded default without one.
pub(crate) fn load_registry(path: Option<&Path>) -> Result<Registry> {
    let registry = match path {
        Some(path) => Registry::from_path(path)?,
        None => Registry::embedded()?,
    };
    Ok(registry)
}
