//! AMQP integration
//!
//! Thin adapter over `lapin` that supplies the two broker-side collaborators
//! the rest of the crate relies on:
//!
//! 1. **Consume**: bind an auto-delete queue to the subscribe exchange and
//!    hand every delivery to a [`MessageHandler`], settling it with the
//!    returned [`AckDecision`]
//! 2. **Publish**: send payloads to the publish exchange through the
//!    [`Publisher`] trait, with publisher confirms logged as they arrive
//!
//! # Submodules
//!
//! - [`consumer`]: queue setup, bounded worker pool, acknowledgment
//! - [`publisher`]: the `Publisher` seam and its `lapin` implementation
//! - [`message`]: the event record carried on both exchanges

pub mod consumer;
pub mod message;
pub mod publisher;

use thiserror::Error;

pub use consumer::{AckDecision, AmqpConsumer, ConsumerOptions, MessageHandler};
pub use message::EventRecord;
pub use publisher::{AmqpPublisher, PublishOptions, Publisher};

/// Errors raised by the broker adapter.
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The connection could not be opened.
    #[error("Unable to initialize RabbitMQ connection: {0}")]
    Connect(#[source] lapin::Error),

    /// Queue, binding or consume setup failed.
    #[error("Unable to initialize RabbitMQ consumer: {0}")]
    Consumer(#[source] lapin::Error),

    /// The delivery stream failed while consuming.
    #[error("RabbitMQ delivery stream failed: {0}")]
    Delivery(#[source] lapin::Error),

    /// The publish channel could not be prepared.
    #[error("Unable to initialize RabbitMQ publisher: {0}")]
    Publisher(#[source] lapin::Error),

    /// A publish was rejected by the channel.
    #[error("{0}")]
    Publish(#[source] lapin::Error),

    /// The publish call was given no routing key to publish to.
    #[error("no routing key given for exchange '{exchange}'")]
    NoRoutingKey {
        /// Target exchange
        exchange: String,
    },
}

/// Open a connection to the broker.
///
/// # Errors
///
/// Returns [`BrokerError::Connect`] if the URI is invalid or the broker is
/// unreachable.
pub async fn connect(uri: &str) -> Result<lapin::Connection, BrokerError> {
    lapin::Connection::connect(uri, lapin::ConnectionProperties::default())
        .await
        .map_err(BrokerError::Connect)
}
