//! # sweeper-cli
//!
//! Binary entry point for Sweeper.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Configuration loading from `sweeper.yaml` plus environment secrets
//! - The bot daemon that turns command-channel messages into purge runs

mod commands;
mod config;
mod daemon;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sweeper", version, about = "Chat-driven bulk account cleanup")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "sweeper.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the bot daemon and watch the command channel.
    Run,
    /// Validate the configuration and print the resolved values.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = config::SweeperConfig::load(&cli.config)?;

    match cli.command {
        Command::Run => daemon::run(config).await,
        Command::CheckConfig => {
            println!("{config:#?}");
            Ok(())
        }
    }
}
