//! Outbound control loop
//!
//! Waits for publish triggers and shutdown on a single task. Each iteration
//! services exactly one wake-up: a trigger, the shutdown token, or the idle
//! tick. Publishing happens inline, so triggers that arrive while a publish
//! is in flight wait in the channel (capacity permitting) and are never
//! merged.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use super::compose::{compose_canned, compose_from_file};
use super::Trigger;
use crate::amqp::{BrokerError, Publisher};
use crate::context::AppContext;
use crate::watcher::OutputSink;

/// Idle tick interval.
pub const TICK: Duration = Duration::from_millis(100);

/// Notice printed when the loop stops.
pub const SHUTDOWN_NOTICE: &str = "Shutting myself down...";

/// Single-task loop turning triggers into publishes.
pub struct ControlLoop {
    ctx: Arc<AppContext>,
    publisher: Arc<dyn Publisher>,
    sink: Arc<dyn OutputSink>,
    tick: Duration,
}

impl ControlLoop {
    /// Create a loop publishing through `publisher` and reporting to `sink`.
    pub fn new(
        ctx: Arc<AppContext>,
        publisher: Arc<dyn Publisher>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            ctx,
            publisher,
            sink,
            tick: TICK,
        }
    }

    /// Override the idle tick interval.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// Publish failures are reported and the loop keeps going. If the
    /// trigger channel closes the loop keeps ticking until shutdown.
    pub async fn run(self, mut triggers: mpsc::Receiver<Trigger>, shutdown: CancellationToken) {
        let mut triggers_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.sink.emit(SHUTDOWN_NOTICE);
                    info!("Control loop stopped");
                    return;
                }
                received = triggers.recv(), if triggers_open => {
                    match received {
                        Some(trigger) => self.handle(trigger).await,
                        None => triggers_open = false,
                    }
                }
                _ = tokio::time::sleep(self.tick) => {}
            }
        }
    }

    /// Compose and publish for one trigger, reporting the outcome.
    pub async fn handle(&self, trigger: Trigger) {
        info!(%trigger, "Received publish trigger, publishing message");
        match self.fire(trigger).await {
            Ok(payload) => {
                let mut line = b"PUBLISHED: \n".to_vec();
                line.extend_from_slice(&payload);
                line.push(b'\n');
                self.sink.emit_raw(&line);
            }
            Err(e) => {
                error!(error = %e, "Error publishing message");
                self.sink.emit(&format!("Error publishing message: {}", e));
            }
        }
    }

    /// Compose the payload for `trigger` and publish it.
    ///
    /// Returns the published payload.
    ///
    /// # Errors
    ///
    /// Returns the [`BrokerError`] from the publisher.
    pub async fn fire(&self, trigger: Trigger) -> Result<Vec<u8>, BrokerError> {
        let payload = match trigger {
            Trigger::Canned => compose_canned(&self.ctx),
            Trigger::FromFile => compose_from_file(&self.ctx),
        };

        let options = self.ctx.publish_options();
        let routing_keys = self.ctx.publish_routing_keys();
        trace!(
            exchange = %options.exchange,
            routing_key = %self.ctx.config.amqp_pub_routing_key,
            "Publishing message: \n{}",
            String::from_utf8_lossy(&payload)
        );

        self.publisher
            .publish(&payload, &routing_keys, &options)
            .await?;
        Ok(payload)
    }
}
