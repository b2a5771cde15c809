//! RabbitHunter - AMQP event watcher and test publisher
//!
//! This library provides the pieces of the `rabbithunter` utility: it binds a
//! queue to a topic exchange, prints the events that pass a three-way filter,
//! and publishes test messages to a second exchange on demand.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `config`: Config file search, comment stripping and field reconciliation
//! - `watcher`: Event filtering, inbound dispatch and logging setup
//! - `amqp`: Broker adapter (consumer, publisher, event record)
//! - `control`: Trigger-driven publish loop and signal bridge
//! - `context`: Immutable runtime context built at startup
//! - `commands`: CLI command handlers
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use rabbithunter::config::AppConfig;
//! use rabbithunter::context::AppContext;
//!
//! fn main() -> anyhow::Result<()> {
//!     let resolution = AppConfig::load(None)?;
//!     let ctx = AppContext::new(resolution.config, "edge01.example.net");
//!     println!("{}", ctx.filter.summary());
//!     Ok(())
//! }
//! ```

pub mod amqp;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod watcher;

// Re-export commonly used types
pub use config::AppConfig;
pub use context::AppContext;
pub use error::{RabbitHunterError, Result};

/// Short application name used in paths, queue names and identifiers.
pub const APP_NAME: &str = "rabbithunter";

/// Full product name.
pub const APP_NAME_FULL: &str = "RuhNet RabbitHunter AMQP Utility";

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project website shown in the banner.
pub const WEBSITE: &str = "https://ruhnet.co";

const BANNER_ART: &str = r"
   ____         __    _    _       __
  / ___\ __  __/ /_  / \  / /__ __/ /_
 / /_/ // /_/ / _  \/ / \/ //__\_  __/
/_/  \_\\ ___/_/ /_/_/ \__/ \__,/_/   ";

/// Startup banner including the website.
pub fn banner() -> String {
    format!(
        "{}{}\n_____________________________________________________\n",
        BANNER_ART, WEBSITE
    )
}

/// Version line printed under the banner.
///
/// # Examples
///
/// ```
/// assert!(rabbithunter::server_version().starts_with("RuhNet rabbithunter v"));
/// ```
pub fn server_version() -> String {
    format!("RuhNet {} v{}", APP_NAME, VERSION)
}

#[cfg(test)]
pub mod test_utils;
