use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::channel::Endpoints;
use crate::server::{self, AppState};

#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1")]
    pub listen: IpAddr,

    /// HTTP server port
    #[arg(short, long, default_value = "10293")]
    pub port: u16,

    /// Channel registry file (YAML); defaults to the embedded registry
    #[arg(short, long)]
    pub channels: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,
}

impl Default for ServeCommand {
    fn default() -> Self {
        Self {
            listen: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 10293,
            channels: None,
            timeout: 10,
        }
    }
}

impl ServeCommand {
    pub async fn run(self) -> Result<()> {
        let registry = Arc::new(super::load_registry(self.channels.as_deref())?);
        let proxied = registry
            .iter()
            .filter(|(provider, _, _)| provider.is_proxied())
            .count();
        info!("serving {proxied} proxy-delegated channels");

        let state = AppState::new(
            registry,
            Endpoints::default(),
            Duration::from_secs(self.timeout),
        )?;
        let addr = SocketAddr::new(self.listen, self.port);
        server::run(addr, state).await
    }
}
