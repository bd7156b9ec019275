use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use crate::channel::{Endpoints, Provider, Resolver};

#[derive(Parser, Debug)]
pub struct CheckCommand {
    /// Provider group to look in
    #[arg(value_enum)]
    pub provider: Provider,

    /// Channel display name as listed in the registry
    pub name: String,

    /// Channel registry file (YAML); defaults to the embedded registry
    #[arg(short, long)]
    pub channels: Option<PathBuf>,

    /// host:port used for proxy-delegated channel URLs
    #[arg(long, default_value = "127.0.0.1:10293")]
    pub proxy_addr: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

impl CheckCommand {
    pub async fn run(self) -> Result<()> {
        let registry = super::load_registry(self.channels.as_deref())?;
        let spec = registry.find(self.provider, &self.name)?;

        let resolver = Resolver::new(
            Endpoints::default(),
            &self.proxy_addr,
            Duration::from_secs(self.timeout),
        )?;
        let url = resolver.resolve(self.provider, &self.name, spec).await?;

        println!("{} [{}]", self.name, spec.effective_id(&self.name));
        println!("  {url}");
        if self.provider.is_proxied() {
            println!("  (resolved live by the redirect proxy at playback time)");
        }
        Ok(())
    }
}
