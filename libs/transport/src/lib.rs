//! TCP Connection Factories
//!
//! This crate owns socket lifecycle for framed TCP connections: a listening
//! factory that accepts connections and decodes inbound frames (source side),
//! and a dialing factory that frames and writes outbound payloads (sink
//! side). One [`framing::FrameDecoder`] is created per physical connection;
//! the encoding mode and frame size bound are read-only shared configuration
//! after `start()`.
//!
//! Per-connection errors never affect sibling connections; `stop()` on a
//! factory is the only whole-factory operation and terminates in-flight
//! decodes with clean end-of-stream semantics.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod server;


pub use client::TcpClientFactory;
pub use config::{ClientConfig, ServerConfig};
pub use connection::{ConnectionStats, FramedConnection};
pub use error::{Result, TransportError};
pub use metrics::{ThroughputSnapshot, ThroughputTracker};
pub use server::{InboundFrame, TcpServerFactory};

/// Default capacity of the inbound frame channel between the server factory
/// and its consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default outbound connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
