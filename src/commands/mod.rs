/*!
Command handlers for the CLI

- `run`: watch the subscribe exchange and publish on trigger
- `check_config`: resolve and print the configuration

Both start from the same configuration resolution step, done here.
*/

use std::path::Path;

use crate::config::{AppConfig, ConfigError, Resolution};
use crate::watcher::{FilterSet, FilterSpec};

pub mod check_config;
pub mod run;

/// Resolve configuration for a command.
///
/// An unreadable config file is reported on STDERR and resolution carries on
/// with environment and defaults. Logging is not set up yet at this point.
///
/// # Errors
///
/// Returns the [`ConfigError`] from resolution.
pub fn load_config(dir_override: Option<&Path>) -> Result<Resolution, ConfigError> {
    let resolution = AppConfig::load(dir_override)?;
    if let Some(e) = &resolution.read_error {
        eprintln!(
            "Could not open config file: {}\n{}",
            resolution.path.display(),
            e
        );
    }
    Ok(resolution)
}

/// Operator-facing description of the three filter dimensions.
///
/// # Examples
///
/// ```
/// use rabbithunter::commands::filter_lines;
/// use rabbithunter::watcher::FilterSpec;
///
/// let lines = filter_lines(&FilterSpec::new("*", "notification,billing", "*"));
/// assert_eq!(lines[1], r#"Filtering event categories matching: ["notification", "billing"]"#);
/// ```
pub fn filter_lines(filter: &FilterSpec) -> [String; 3] {
    fn line(label: &str, set: &FilterSet) -> String {
        format!("Filtering event {} matching: {:?}", label, set.tokens())
    }
    [
        line("app names", filter.app_names()),
        line("categories", filter.categories()),
        line("names", filter.names()),
    ]
}
