//! Watcher module for the subscribe exchange
//!
//! Everything needed to turn raw deliveries into operator output:
//!
//! 1. Parse the three filter dimensions from configuration
//! 2. Decode each delivery into an event record
//! 3. Print the records that pass the filter
//! 4. Log to a file and optionally to STDOUT
//!
//! # Modules
//!
//! - [`filter`]: Event filtering by application name, category and name
//! - [`dispatcher`]: Per-delivery decode, filter and acknowledgment decision
//! - [`logging`]: Structured logging configuration

pub mod dispatcher;
pub mod filter;
pub mod logging;

pub use dispatcher::{Dispatcher, MemorySink, OutputSink, StdoutSink};
pub use filter::{FilterSet, FilterSpec, WILDCARD};
