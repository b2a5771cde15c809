//! RabbitHunter - AMQP event watcher and test publisher
//!
#![doc = "Main entry point for the rabbithunter utility."]

use anyhow::Result;

use rabbithunter::cli::{Cli, Commands};
use rabbithunter::commands;
use rabbithunter::watcher::StdoutSink;
use rabbithunter::RabbitHunterError;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Resolve configuration; every field problem is reported at once
    let resolution =
        commands::load_config(cli.config_dir.as_deref()).map_err(RabbitHunterError::from)?;

    match cli.command() {
        Commands::Run => commands::run::run(resolution, cli.verbose).await,
        Commands::CheckConfig => commands::check_config::check_config(&resolution, &StdoutSink),
    }
}
