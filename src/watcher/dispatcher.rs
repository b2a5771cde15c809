//! Inbound message dispatch
//!
//! Decodes each delivery from the subscribe queue, runs it through the
//! [`FilterSpec`] and prints the matches. Filtering never rejects a message:
//! everything that decodes is acknowledged. Payloads that fail to decode are
//! rejected without requeue since redelivery cannot fix them.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, trace, warn};

use super::filter::FilterSpec;
use crate::amqp::{AckDecision, EventRecord, MessageHandler};

/// Numeric log level above which the routing key is printed with a match.
pub const ROUTING_KEY_LEVEL: i64 = 4;

/// Destination for matched messages.
pub trait OutputSink: Send + Sync {
    /// Emit one line of output.
    fn emit(&self, line: &str);

    /// Emit one line of raw bytes, which need not be UTF-8.
    fn emit_raw(&self, line: &[u8]) {
        self.emit(&String::from_utf8_lossy(line));
    }
}

/// Writes matches to STDOUT.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, line: &str) {
        println!("{}", line);
    }

    fn emit_raw(&self, line: &[u8]) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(line).and_then(|_| stdout.write_all(b"\n")) {
            warn!(error = %e, "Failed to write message to STDOUT");
        }
    }
}

/// Collects output in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far, decoded lossily.
    pub fn lines(&self) -> Vec<String> {
        self.raw_lines()
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    /// Lines emitted so far, byte for byte.
    pub fn raw_lines(&self) -> Vec<Vec<u8>> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn emit(&self, line: &str) {
        self.emit_raw(line.as_bytes());
    }

    fn emit_raw(&self, line: &[u8]) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_vec());
        }
    }
}

/// [`MessageHandler`] that filters deliveries and prints the matches.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use rabbithunter::amqp::{AckDecision, MessageHandler};
/// use rabbithunter::watcher::{Dispatcher, FilterSpec, MemorySink};
///
/// let sink = Arc::new(MemorySink::new());
/// let filter = Arc::new(FilterSpec::new("*", "billing", "*"));
/// let dispatcher = Dispatcher::new(filter, 5, sink.clone());
///
/// let body = br#"{"Event-Category": "billing"}"#;
/// assert_eq!(dispatcher.handle(body, "call.billing.x"), AckDecision::Ack);
/// assert_eq!(sink.lines().len(), 2);
/// ```
pub struct Dispatcher {
    filter: Arc<FilterSpec>,
    show_routing_key: bool,
    sink: Arc<dyn OutputSink>,
}

impl Dispatcher {
    /// Create a dispatcher for `filter`.
    ///
    /// `log_level` decides whether routing keys are printed with matches.
    pub fn new(filter: Arc<FilterSpec>, log_level: i64, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            filter,
            show_routing_key: log_level > ROUTING_KEY_LEVEL,
            sink,
        }
    }

    /// Dispatcher printing to STDOUT.
    pub fn stdout(filter: Arc<FilterSpec>, log_level: i64) -> Self {
        Self::new(filter, log_level, Arc::new(StdoutSink))
    }

    /// Filter in use.
    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }
}

impl MessageHandler for Dispatcher {
    fn handle(&self, body: &[u8], routing_key: &str) -> AckDecision {
        let text = String::from_utf8_lossy(body);
        trace!(%routing_key, "AMQP message received: {}", text);

        if self.filter.is_match_all() {
            self.sink.emit_raw(body);
            return AckDecision::Ack;
        }

        let record = match EventRecord::decode(body) {
            Ok(record) => record,
            Err(e) => {
                info!(
                    error = %e,
                    "Error decoding AMQP message, discarding. Message body: {}",
                    text
                );
                return AckDecision::NackDiscard;
            }
        };

        if self.filter.matches(&record) {
            if self.show_routing_key {
                self.sink.emit(&format!("RoutingKey: {}", routing_key));
            }
            self.sink.emit_raw(body);
        } else {
            debug!(
                app_name = %record.app_name,
                event_category = %record.event_category,
                event_name = %record.event_name,
                "Event filtered out"
            );
        }

        AckDecision::Ack
    }
}
