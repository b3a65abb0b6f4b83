//! Factory configuration.
//!
//! Plain serde-derived structs validated at factory construction. All fields
//! are read-only shared state once a factory has started.

use std::time::Duration;

use framing::{Encoding, DEFAULT_MAX_FRAME_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};
use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_TIMEOUT_SECS};

/// Listening (source-side) factory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Local address to bind to.
    pub host: String,
    /// Listening port; 0 lets the OS choose (the bound port is reported by
    /// `start()`).
    pub port: u16,
    /// Framing mode applied to every accepted connection.
    pub encoding: Encoding,
    /// Upper bound on one decoded frame, in bytes.
    pub max_frame_size: usize,
    /// Idle-read timeout; elapsing closes the connection (treated as a
    /// clean close, not a failure).
    pub socket_timeout: Option<Duration>,
    /// Resolve the peer address to a hostname once per connection. Affects
    /// only frame metadata, never decode correctness.
    pub reverse_lookup: bool,
    /// Set TCP_NODELAY on accepted sockets.
    pub nodelay: bool,
    /// Capacity of the inbound frame channel.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            encoding: Encoding::Crlf,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            socket_timeout: None,
            reverse_lookup: false,
            nodelay: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Validate the configuration, rejecting values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(TransportError::configuration(
                "bind host must not be empty",
                Some("host"),
            ));
        }
        if self.max_frame_size == 0 {
            return Err(TransportError::configuration(
                "max frame size must be non-zero",
                Some("max_frame_size"),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(TransportError::configuration(
                "channel capacity must be non-zero",
                Some("channel_capacity"),
            ));
        }
        Ok(())
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dialing (sink-side) factory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote host to connect to.
    pub host: String,
    /// Remote port.
    pub port: u16,
    /// Framing mode applied to every outbound frame.
    pub encoding: Encoding,
    /// Upper bound accepted by this side's decoder (kept symmetric with the
    /// server side even though the sink path only writes).
    pub max_frame_size: usize,
    /// Deadline for establishing the outbound socket.
    pub connect_timeout: Duration,
    /// Idle-read timeout applied if the connection is ever read from.
    pub socket_timeout: Option<Duration>,
    /// Close the connection after each written frame, forcing a fresh TCP
    /// handshake per outbound message (message isolation over latency).
    pub single_use: bool,
    /// Set TCP_NODELAY on outbound sockets.
    pub nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            encoding: Encoding::Crlf,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            socket_timeout: None,
            single_use: false,
            nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Validate the configuration, rejecting values that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(TransportError::configuration(
                "target host must not be empty",
                Some("host"),
            ));
        }
        if self.port == 0 {
            return Err(TransportError::configuration(
                "target port must be non-zero",
                Some("port"),
            ));
        }
        if self.max_frame_size == 0 {
            return Err(TransportError::configuration(
                "max frame size must be non-zero",
                Some("max_frame_size"),
            ));
        }
        Ok(())
    }

    /// `host:port` string for dialing.
    pub fn remote_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
