//! `check-config`: print the resolved configuration.

use crate::config::Resolution;
use crate::error::Result;
use crate::watcher::OutputSink;

use super::filter_lines;

/// Print the resolved configuration as pretty JSON followed by the filters.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn check_config(resolution: &Resolution, sink: &dyn OutputSink) -> Result<()> {
    match &resolution.read_error {
        Some(_) => sink.emit(&format!(
            "Config file: {} (not readable, using environment and defaults)",
            resolution.path.display()
        )),
        None => sink.emit(&format!("Config file: {}", resolution.path.display())),
    }
    sink.emit(&serde_json::to_string_pretty(&resolution.config)?);
    for line in filter_lines(&resolution.config.filter_spec()) {
        sink.emit(&line);
    }
    sink.emit("Configuration OK");
    Ok(())
}
