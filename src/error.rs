//! Error types for RabbitHunter
//!
//! This module defines the top-level error type used throughout the
//! application, using `thiserror` for ergonomic error handling. Modules with
//! richer failure modes (configuration, logging, broker) keep their own typed
//! errors and convert into this one at the application boundary.

use thiserror::Error;

use crate::amqp::BrokerError;
use crate::config::ConfigError;
use crate::watcher::logging::LoggingError;

/// Main error type for RabbitHunter operations
#[derive(Error, Debug)]
pub enum RabbitHunterError {
    /// Configuration could not be resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No log destination could be opened
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Broker connection, topology or delivery errors
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// The local hostname could not be detected
    #[error("Hostname could not be auto-detected from system: {0}")]
    Hostname(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for RabbitHunter operations
///
/// Uses `anyhow::Error` so startup failures can carry context up to `main`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_error_display() {
        let error = RabbitHunterError::Hostname("no such file".to_string());
        assert_eq!(
            error.to_string(),
            "Hostname could not be auto-detected from system: no such file"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let error: RabbitHunterError = ConfigError::Parse {
            path: "/etc/rabbithunter_config.json".into(),
            message: "trailing comma".to_string(),
        }
        .into();
        assert!(error
            .to_string()
            .starts_with("Could not parse config file: /etc/rabbithunter_config.json"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: RabbitHunterError = io_error.into();
        assert!(matches!(error, RabbitHunterError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: RabbitHunterError = json_error.into();
        assert!(matches!(error, RabbitHunterError::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RabbitHunterError>();
    }
}
