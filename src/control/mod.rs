//! Outbound publishing driven by external triggers
//!
//! # Modules
//!
//! - [`compose`]: builds the payload for each trigger kind
//! - [`publish_loop`]: the single-task loop that publishes on trigger
//! - [`signals`]: maps process signals onto triggers and shutdown

pub mod compose;
pub mod publish_loop;
pub mod signals;

use std::fmt;

pub use publish_loop::{ControlLoop, SHUTDOWN_NOTICE, TICK};
pub use signals::spawn_signal_bridge;

/// Which payload a publish trigger asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Synthesized test record with fresh identifiers (`SIGUSR1`)
    Canned,
    /// Contents of the payload file, or the default literal (`SIGUSR2`)
    FromFile,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Canned => write!(f, "canned"),
            Trigger::FromFile => write!(f, "from-file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_display() {
        assert_eq!(Trigger::Canned.to_string(), "canned");
        assert_eq!(Trigger::FromFile.to_string(), "from-file");
    }
}
