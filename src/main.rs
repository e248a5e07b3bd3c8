//! cxrefs CLI entry point

use anyhow::Context;
use clap::Parser;
use cxrefs::cli::{Cli, Commands};
use cxrefs::core::config::Config;
use cxrefs::core::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    logging::init(&config.log_level);

    match cli.command {
        Commands::Callers(args) => cxrefs::cli::callers::run(args, &config)?,
        Commands::Xrefs(args) => cxrefs::cli::xrefs::run(args, &config)?,
        Commands::Jump(args) => cxrefs::cli::jump::run(args, &config)?,
    }

    Ok(())
}
