use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use triarb_analysis::application::{Cli, CommandExecutor};
use triarb_analysis::shared::config::ConfigLoader;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    // Config file first, then CLI flags on top
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    CommandExecutor::execute(cli.command, config)?;
    Ok(())
}
