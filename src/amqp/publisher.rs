//! Publishing to the publish exchange.
//!
//! The [`Publisher`] trait is the seam the control loop talks to. The
//! [`AmqpPublisher`] implementation puts its channel in confirm mode and
//! reports broker confirmations and returned messages in the log as they
//! arrive, without holding up the caller.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::publisher_confirm::{Confirmation, PublisherConfirm};
use lapin::{BasicProperties, Channel, Connection};
use tracing::{debug, trace, warn};

use super::BrokerError;

/// Per-publish settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Target exchange
    pub exchange: String,
    /// MIME type stamped on the message
    pub content_type: String,
    /// Ask the broker to return the message if nothing is bound for it
    pub mandatory: bool,
}

impl PublishOptions {
    /// JSON publish to `exchange` with the mandatory flag set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rabbithunter::amqp::PublishOptions;
    ///
    /// let options = PublishOptions::json("pushes");
    /// assert_eq!(options.content_type, "application/json");
    /// assert!(options.mandatory);
    /// ```
    pub fn json(exchange: &str) -> Self {
        Self {
            exchange: exchange.to_string(),
            content_type: "application/json".to_string(),
            mandatory: true,
        }
    }
}

/// Something that can put a payload on an exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` once per routing key.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::NoRoutingKey`] when `routing_keys` is empty and
    /// [`BrokerError::Publish`] when the channel rejects the publish.
    async fn publish(
        &self,
        payload: &[u8],
        routing_keys: &[String],
        options: &PublishOptions,
    ) -> Result<(), BrokerError>;
}

/// [`Publisher`] backed by a confirm-mode `lapin` channel.
pub struct AmqpPublisher {
    channel: Channel,
}

impl AmqpPublisher {
    /// Open a channel on `connection` and enable publisher confirms.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Publisher`] if the channel cannot be opened or
    /// confirm mode is refused.
    pub async fn new(connection: &Connection) -> Result<Self, BrokerError> {
        let channel = connection
            .create_channel()
            .await
            .map_err(BrokerError::Publisher)?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(BrokerError::Publisher)?;

        debug!(channel_id = channel.id(), "Publisher channel ready");
        Ok(Self { channel })
    }
}

#[async_trait]
impl Publisher for AmqpPublisher {
    async fn publish(
        &self,
        payload: &[u8],
        routing_keys: &[String],
        options: &PublishOptions,
    ) -> Result<(), BrokerError> {
        if routing_keys.is_empty() {
            return Err(BrokerError::NoRoutingKey {
                exchange: options.exchange.clone(),
            });
        }

        for routing_key in routing_keys {
            let properties =
                BasicProperties::default().with_content_type(options.content_type.clone().into());
            let confirm = self
                .channel
                .basic_publish(
                    &options.exchange,
                    routing_key,
                    BasicPublishOptions {
                        mandatory: options.mandatory,
                        ..BasicPublishOptions::default()
                    },
                    payload,
                    properties,
                )
                .await
                .map_err(BrokerError::Publish)?;

            tokio::spawn(report_confirmation(
                confirm,
                options.exchange.clone(),
                routing_key.clone(),
            ));
        }

        Ok(())
    }
}

async fn report_confirmation(confirm: PublisherConfirm, exchange: String, routing_key: String) {
    match confirm.await {
        Ok(Confirmation::Ack(None)) => {
            trace!(%exchange, %routing_key, "Message confirmed by broker");
        }
        Ok(Confirmation::Ack(Some(returned))) => {
            warn!(
                %exchange,
                %routing_key,
                reply_code = returned.reply_code,
                reply_text = returned.reply_text.as_str(),
                "Message returned by broker"
            );
        }
        Ok(Confirmation::Nack(returned)) => {
            warn!(
                %exchange,
                %routing_key,
                returned = returned.is_some(),
                "Message nacked by broker"
            );
        }
        Ok(Confirmation::NotRequested) => {
            trace!(%exchange, %routing_key, "Publish confirms not enabled on channel");
        }
        Err(e) => {
            warn!(%exchange, %routing_key, error = %e, "Publish confirmation failed");
        }
    }
}
