//! Message abstraction at the adapter boundary.
//!
//! A message is a byte payload plus a key-value metadata view. The transport
//! below and the messaging framework above only agree on this shape; nothing
//! here interprets payload contents.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::charset::Charset;
use crate::error::AdapterError;

/// One application message crossing the adapter boundary.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Raw payload bytes (one decoded frame, or one frame to encode).
    pub payload: Bytes,
    /// Connection and bookkeeping metadata.
    pub metadata: MessageMetadata,
}

impl Message {
    /// Create a message from payload bytes.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            metadata: MessageMetadata::new(),
        }
    }

    /// Create a message from text under the given charset.
    pub fn from_text(text: &str, charset: Charset) -> Result<Self, AdapterError> {
        Ok(Self::new(charset.encode(text)?))
    }

    /// Create a message with explicit metadata.
    pub fn with_metadata(payload: impl Into<Bytes>, metadata: MessageMetadata) -> Self {
        Self {
            payload: payload.into(),
            metadata,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Text view of the payload under the given charset.
    pub fn payload_text(&self, charset: Charset) -> Result<String, AdapterError> {
        charset.decode(&self.payload)
    }
}

/// Metadata attached to a [`Message`].
#[derive(Debug, Clone, Default)]
pub struct MessageMetadata {
    /// Remote address of the connection the payload arrived on (source side).
    pub peer_addr: Option<SocketAddr>,
    /// Reverse-DNS hostname of the peer, when resolved.
    pub peer_host: Option<String>,
    /// Creation timestamp, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
    /// Free-form additional entries.
    pub extras: HashMap<String, String>,
}

impl MessageMetadata {
    /// Create metadata stamped with the current time.
    pub fn new() -> Self {
        Self {
            peer_addr: None,
            peer_host: None,
            timestamp_ns: now_ns(),
            extras: HashMap::new(),
        }
    }

    /// Set the peer address.
    pub fn with_peer_addr(mut self, addr: SocketAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Set the peer hostname.
    pub fn with_peer_host(mut self, host: impl Into<String>) -> Self {
        self.peer_host = Some(host.into());
        self
    }

    /// Add a free-form entry.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Flatten into the key-value map shape expected by messaging layers.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = self.extras.clone();
        if let Some(addr) = self.peer_addr {
            map.insert("ip_address".to_string(), addr.ip().to_string());
            map.insert("remote_port".to_string(), addr.port().to_string());
        }
        if let Some(host) = &self.peer_host {
            map.insert("hostname".to_string(), host.clone());
        }
        map.insert("timestamp_ns".to_string(), self.timestamp_ns.to_string());
        map
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_text_view() {
        let message = Message::from_text("hello", Charset::Utf8).unwrap();
        assert_eq!(message.size(), 5);
        assert_eq!(message.payload_text(Charset::Utf8).unwrap(), "hello");
    }

    #[test]
    fn test_metadata_map_includes_peer() {
        let addr: SocketAddr = "192.0.2.1:5150".parse().unwrap();
        let metadata = MessageMetadata::new()
            .with_peer_addr(addr)
            .with_peer_host("peer.example")
            .with_extra("connection_id", "7");

        let map = metadata.to_map();
        assert_eq!(map.get("ip_address").unwrap(), "192.0.2.1");
        assert_eq!(map.get("remote_port").unwrap(), "5150");
        assert_eq!(map.get("hostname").unwrap(), "peer.example");
        assert_eq!(map.get("connection_id").unwrap(), "7");
        assert!(map.contains_key("timestamp_ns"));
    }

    #[test]
    fn test_metadata_is_stamped() {
        let metadata = MessageMetadata::new();
        assert!(metadata.timestamp_ns > 0);
    }
}
