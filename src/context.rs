//! Runtime context shared by the consumer and the control loop.
//!
//! Built once at startup after configuration has been resolved and never
//! mutated afterwards, so it can be shared across tasks behind an `Arc`
//! without locking.

use std::io;
use std::sync::Arc;

use crate::amqp::{ConsumerOptions, PublishOptions};
use crate::config::AppConfig;
use crate::error::RabbitHunterError;
use crate::watcher::FilterSpec;
use crate::APP_NAME;

/// Immutable process-wide state.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Arc<AppConfig>,
    /// Filter derived from the configuration
    pub filter: Arc<FilterSpec>,
    /// Fully qualified hostname
    pub hostname: String,
    /// Hostname up to the first dot
    pub short_hostname: String,
}

impl AppContext {
    /// Build the context for `config` running on `hostname`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rabbithunter::config::AppConfig;
    /// use rabbithunter::context::AppContext;
    ///
    /// let ctx = AppContext::new(AppConfig::default(), "edge01.example.net");
    /// assert_eq!(ctx.short_hostname, "edge01");
    /// assert_eq!(ctx.server_id(), "rabbithunter@edge01.example.net");
    /// ```
    pub fn new(config: AppConfig, hostname: &str) -> Self {
        let filter = Arc::new(config.filter_spec());
        Self {
            config: Arc::new(config),
            filter,
            hostname: hostname.to_string(),
            short_hostname: short_hostname(hostname).to_string(),
        }
    }

    /// Server identifier stamped on synthesized events.
    pub fn server_id(&self) -> String {
        format!("{}@{}", APP_NAME, self.hostname)
    }

    /// Consumer settings for the subscribe exchange.
    pub fn consumer_options(&self) -> ConsumerOptions {
        ConsumerOptions::new(
            &self.config.amqp_sub_exchange,
            &self.config.amqp_sub_routing_key,
            &self.short_hostname,
        )
        .with_exchange_kind(&self.config.amqp_exchange_type)
        .with_workers(self.config.workers())
    }

    /// Publish settings for the publish exchange.
    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions::json(&self.config.amqp_pub_exchange)
    }

    /// Routing keys used for every publish.
    pub fn publish_routing_keys(&self) -> Vec<String> {
        vec![self.config.amqp_pub_routing_key.clone()]
    }
}

/// Hostname up to the first dot.
pub fn short_hostname(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// Detect the local hostname.
///
/// Asks the operating system first and falls back to the `HOSTNAME`
/// environment variable.
///
/// # Errors
///
/// Returns [`RabbitHunterError::Hostname`] when neither source yields a
/// non-empty name.
pub fn detect_hostname() -> Result<String, RabbitHunterError> {
    detect_hostname_from(system_hostname(), std::env::var("HOSTNAME").ok())
}

#[cfg(unix)]
fn system_hostname() -> io::Result<String> {
    let mut buf = [0u8; 256];
    // SAFETY: buf is valid for writes of buf.len() bytes for the whole call.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

#[cfg(not(unix))]
fn system_hostname() -> io::Result<String> {
    std::env::var("COMPUTERNAME").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))
}

fn detect_hostname_from(
    system: io::Result<String>,
    env_value: Option<String>,
) -> Result<String, RabbitHunterError> {
    if let Ok(name) = &system {
        let name = name.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }

    match env_value.map(|v| v.trim().to_string()) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(RabbitHunterError::Hostname(match system {
            Err(e) => e.to_string(),
            Ok(_) => "system hostname is empty and HOSTNAME is unset".to_string(),
        })),
    }
}
