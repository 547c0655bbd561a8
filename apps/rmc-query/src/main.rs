#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML -> RMC__ env; -v raises the log level on top
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match &cli.command {
        Commands::Query(args) => commands::query(&config, args).await,
        Commands::Token => commands::token(&config).await,
        Commands::Check => commands::check(&config),
    }
}
