//! Inbound message source.
//!
//! Wraps a listening [`TcpServerFactory`] and turns its decoded frames into
//! [`Message`]s carrying peer metadata. One source owns one listener; frames
//! from a single connection arrive in receipt order.

use std::net::SocketAddr;

use tokio::sync::mpsc;
use tracing::info;
use transport::{InboundFrame, TcpServerFactory};

use crate::charset::Charset;
use crate::config::SourceConfig;
use crate::error::AdapterError;
use crate::message::{Message, MessageMetadata};

/// Message source backed by a listening TCP factory.
pub struct TcpSource {
    factory: TcpServerFactory,
    receiver: mpsc::Receiver<InboundFrame>,
    charset: Charset,
}

impl TcpSource {
    /// Create a source from configuration. Does not bind until [`Self::start`].
    pub fn new(config: SourceConfig) -> Result<Self, AdapterError> {
        config.validate()?;
        let charset = config.charset;
        let (factory, receiver) = TcpServerFactory::new(config.server)?;
        Ok(Self {
            factory,
            receiver,
            charset,
        })
    }

    /// Bind the listener and start accepting. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, AdapterError> {
        let addr = self.factory.start().await?;
        info!(addr = %addr, "message source started");
        Ok(addr)
    }

    /// Receive the next inbound message.
    ///
    /// Returns `None` once the source is stopped and every buffered frame
    /// has been drained.
    pub async fn recv(&mut self) -> Option<Message> {
        let frame = self.receiver.recv().await?;
        Some(message_from_frame(frame))
    }

    /// Stop listening and close every open connection.
    pub async fn stop(&self) {
        self.factory.stop().await;
        info!("message source stopped");
    }

    /// Bound address, when started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.factory.local_addr().await
    }

    /// Charset used for text views of inbound payloads.
    pub fn charset(&self) -> Charset {
        self.charset
    }
}

impl std::fmt::Debug for TcpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpSource")
            .field("charset", &self.charset)
            .finish()
    }
}

fn message_from_frame(frame: InboundFrame) -> Message {
    let mut metadata = MessageMetadata::new().with_peer_addr(frame.peer_addr);
    if let Some(host) = frame.peer_host {
        metadata = metadata.with_peer_host(host);
    }
    Message::with_metadata(frame.payload, metadata)
}
