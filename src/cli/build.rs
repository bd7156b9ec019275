use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;

use crate::channel::{Endpoints, Resolver};
use crate::playlist::{AssembleOptions, assemble};

#[derive(Parser, Debug)]
pub struct BuildCommand {
    /// Output playlist path
    #[arg(short, long, default_value = "iptv-italy.m3u")]
    pub output: PathBuf,

    /// Channel registry file (YAML); defaults to the embedded registry
    #[arg(short, long)]
    pub channels: Option<PathBuf>,

    /// Base URL for channel logos ({base}/{id}.png)
    #[arg(long)]
    pub logos_url: Option<String>,

    /// host:port the redirect proxy is reachable at, baked into the URLs of
    /// proxy-delegated channels
    #[arg(long, default_value = "127.0.0.1:10293")]
    pub proxy_addr: String,

    /// Maximum concurrent channel resolutions
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Abort without writing anything when any channel fails to resolve
    #[arg(long)]
    pub strict: bool,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            output: PathBuf::from("iptv-italy.m3u"),
            channels: None,
            logos_url: None,
            proxy_addr: "127.0.0.1:10293".to_string(),
            jobs: 4,
            timeout: 10,
            strict: false,
        }
    }
}

impl BuildCommand {
    pub async fn run(self) -> Result<()> {
        let registry = super::load_registry(self.channels.as_deref())?;
        let resolver = Resolver::new(
            Endpoints::default(),
            &self.proxy_addr,
            Duration::from_secs(self.timeout),
        )?;

        info!("resolving {} channels", registry.len());
        let options = AssembleOptions {
            logos_url: self.logos_url.clone(),
            jobs: self.jobs,
        };
        let report = assemble(&registry, &resolver, &options).await;

        if self.strict && !report.failures.is_empty() {
            bail!(
                "{} of {} channels failed to resolve",
                report.failures.len(),
                registry.len()
            );
        }

        report.playlist.dump(&self.output)?;
        info!(
            "wrote {} channels to {}",
            report.playlist.channels().len(),
            self.output.display()
        );

        if !report.failures.is_empty() {
            bail!("{} channels were skipped", report.failures.len());
        }
        Ok(())
    }
}
