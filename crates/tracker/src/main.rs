//! Inventory Tracker - Main Entry Point

use anyhow::Context;
use clap::Parser;
use tracker::cli::{execute, Cli};
use tracker::{init_logging, Controller, Settings};
use tracing::{debug, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(database) = &cli.database {
        settings.database_path = database.clone();
    }

    init_logging(&settings)?;
    info!("=== Inventory Tracker v{} ===", env!("CARGO_PKG_VERSION"));
    debug!(?settings, "Loaded settings");

    let mut controller = Controller::open(&settings)
        .await
        .with_context(|| format!("failed to open {}", settings.database_path.display()))?;

    let output = execute(&cli.command, &mut controller, cli.json).await?;
    println!("{}", output);

    Ok(())
}
