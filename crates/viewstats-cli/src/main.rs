//! Main entry point for viewstats.

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use viewstats_cli::{load_config, run, Cli};
use viewstats_common::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    debug!(?cli, "Starting viewstats");

    let mut stdout = std::io::stdout().lock();
    let output = run(&cli, &config, &mut stdout).await?;

    for path in output.report.iter().chain(&output.charts) {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
