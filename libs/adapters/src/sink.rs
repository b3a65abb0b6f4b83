//! Outbound message sink.
//!
//! The [`MessageSink`] trait is the seam the surrounding messaging layer
//! writes through; [`TcpSink`] implements it over a dialing factory. Each
//! message becomes exactly one frame. Delivery failures surface to the
//! caller; retry policy lives above this layer.

use async_trait::async_trait;
use tracing::{debug, info};
use transport::TcpClientFactory;

use crate::charset::Charset;
use crate::config::SinkConfig;
use crate::error::AdapterError;
use crate::message::Message;

/// Destination for outbound messages.
#[async_trait]
pub trait MessageSink: Send + Sync + std::fmt::Debug {
    /// Deliver one message. An error means the message was not delivered.
    async fn send(&self, message: Message) -> Result<(), AdapterError>;
}

/// Message sink backed by a dialing TCP factory.
#[derive(Debug)]
pub struct TcpSink {
    factory: TcpClientFactory,
    charset: Charset,
}

impl TcpSink {
    /// Create a sink from configuration. No socket is opened until the
    /// first send.
    pub fn new(config: SinkConfig) -> Result<Self, AdapterError> {
        config.validate()?;
        let charset = config.charset;
        let factory = TcpClientFactory::new(config.client)?;
        info!(
            remote = %factory.config().remote_addr(),
            encoding = %factory.config().encoding,
            single_use = factory.config().single_use,
            "message sink created"
        );
        Ok(Self { factory, charset })
    }

    /// Encode text under the sink's charset and deliver it as one message.
    pub async fn send_text(&self, text: &str) -> Result<(), AdapterError> {
        let message = Message::from_text(text, self.charset)?;
        self.send(message).await
    }

    /// Close the held connection, if any. The next send dials again.
    pub async fn close(&self) {
        self.factory.close().await;
        debug!("message sink closed");
    }

    /// Charset used for encoding outbound text payloads.
    pub fn charset(&self) -> Charset {
        self.charset
    }
}

#[async_trait]
impl MessageSink for TcpSink {
    async fn send(&self, message: Message) -> Result<(), AdapterError> {
        self.factory.send(&message.payload).await?;
        debug!(bytes = message.size(), "delivered message");
        Ok(())
    }
}
