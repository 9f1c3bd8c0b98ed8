//! Keytree CLI Binary
//!
//! Command-line interface for browsing and managing a remote object store.

use anyhow::Context;
use clap::Parser;
use keytree::cli::{Cli, CliContext};
use keytree::config::ExplorerConfig;
use keytree::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        ExplorerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    init_logging(&config.logging).context("failed to initialize logging")?;

    let context = CliContext::new(&config).context("failed to initialize store client")?;

    match context.execute(&cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
