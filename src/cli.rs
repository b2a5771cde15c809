//! Command-line interface definition for RabbitHunter
//!
//! This module defines the CLI structure using clap's derive API. Running
//! without a subcommand starts the full utility.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RabbitHunter - AMQP event watcher and test publisher
///
/// Prints filtered events from the subscribe exchange and publishes a test
/// message on SIGUSR1 (canned record) or SIGUSR2 (payload file).
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rabbithunter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding rabbithunter_config.json (skips the directory search)
    #[arg(short = 'd', long, env = "CONFDIR")]
    pub config_dir: Option<PathBuf>,

    /// Mirror log output to STDOUT regardless of log_level
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for RabbitHunter
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Watch the subscribe exchange and publish on signal
    Run,

    /// Resolve configuration, print it and exit
    CheckConfig,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand to execute, `run` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}
