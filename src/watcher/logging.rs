//! Structured logging setup
//!
//! Every event goes to the configured log file. Events are mirrored to
//! STDOUT when the numeric log level is 8 or higher, or when `--verbose` is
//! passed. `RUST_LOG` overrides the numeric level when set.
//!
//! Numeric levels map onto `tracing` levels as follows:
//!
//! | log_level | tracing level |
//! |-----------|---------------|
//! | 0..=3     | error         |
//! | 4         | warn          |
//! | 5         | info          |
//! | 6         | debug         |
//! | 7 and up  | trace         |

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::AppConfig;
use crate::APP_NAME;

/// Numeric level from which log output is mirrored to STDOUT.
pub const STDOUT_LEVEL: i64 = 8;

/// Errors raised while installing the log subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// Neither the configured log file nor the fallback could be opened.
    #[error("Can't open even {} log file!\n{source}", .fallback.display())]
    Open {
        /// Configured log file
        path: PathBuf,
        /// Fallback log file that also failed
        fallback: PathBuf,
        /// Error from the fallback attempt
        #[source]
        source: io::Error,
    },

    /// The level directive could not be parsed.
    #[error("Invalid log filter '{directive}': {reason}")]
    Filter {
        /// Directive that failed
        directive: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("Logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Map a numeric log level onto a `tracing` level directive.
///
/// # Examples
///
/// ```
/// use rabbithunter::watcher::logging::level_filter;
///
/// assert_eq!(level_filter(5), "info");
/// assert_eq!(level_filter(9), "trace");
/// ```
pub fn level_filter(log_level: i64) -> &'static str {
    match log_level {
        i64::MIN..=3 => "error",
        4 => "warn",
        5 => "info",
        6 => "debug",
        _ => "trace",
    }
}

/// Whether log output should also be written to STDOUT.
pub fn mirrors_to_stdout(log_level: i64, verbose: bool) -> bool {
    verbose || log_level >= STDOUT_LEVEL
}

/// Fallback log file used when the configured one cannot be opened.
pub fn fallback_log_path() -> PathBuf {
    Path::new("/tmp").join(format!("{}.log", APP_NAME))
}

/// Open `path` for appending, falling back to `fallback`.
///
/// Returns the open file and the path that was actually used.
///
/// # Errors
///
/// Returns [`LoggingError::Open`] if both paths fail.
pub fn open_log_file(path: &Path, fallback: &Path) -> Result<(File, PathBuf), LoggingError> {
    match append(path) {
        Ok(file) => Ok((file, path.to_path_buf())),
        Err(e) => {
            eprintln!("Could not open log file: {}\n{}", path.display(), e);
            let file = append(fallback).map_err(|source| LoggingError::Open {
                path: path.to_path_buf(),
                fallback: fallback.to_path_buf(),
                source,
            })?;
            Ok((file, fallback.to_path_buf()))
        }
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber for `config`.
///
/// Returns the log file path in use, which differs from `config.log_file`
/// when the fallback was taken.
///
/// # Errors
///
/// Returns [`LoggingError`] if no log file can be opened, the filter is
/// invalid, or a subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use rabbithunter::config::AppConfig;
/// use rabbithunter::watcher::logging::init_logging;
///
/// let config = AppConfig {
///     log_file: "/tmp/rabbithunter.log".to_string(),
///     log_level: 5,
///     ..AppConfig::default()
/// };
/// let path = init_logging(&config, false).unwrap();
/// println!("logging to {}", path.display());
/// ```
pub fn init_logging(config: &AppConfig, verbose: bool) -> Result<PathBuf, LoggingError> {
    let (file, path) = open_log_file(Path::new(&config.log_file), &fallback_log_path())?;

    let directive = level_filter(config.log_level);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| LoggingError::Filter {
            directive: directive.to_string(),
            reason: e.to_string(),
        })?;

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    let file = Arc::new(file);
    if config.log_json {
        layers.push(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(file)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_writer(file)
                .boxed(),
        );
    }

    if mirrors_to_stdout(config.log_level, verbose) {
        if config.log_json {
            layers.push(fmt::layer().json().with_current_span(true).boxed());
        } else {
            layers.push(fmt::layer().with_target(true).with_level(true).boxed());
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(path)
}
