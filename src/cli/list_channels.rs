use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ListChannelsCommand {
    /// Channel registry file (YAML); defaults to the embedded registry
    #[arg(short, long)]
    pub channels: Option<PathBuf>,
}

impl ListChannelsCommand {
    pub async fn run(self) -> Result<()> {
        let registry = super::load_registry(self.channels.as_deref())?;

        println!("Channels ({}):", registry.len());
        for (provider, name, spec) in registry.iter() {
            let number = spec
                .number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {number:>4}  {name}  [{provider}:{}]", spec.effective_id(name));
        }
        Ok(())
    }
}
