//! Source and Sink Adapters
//!
//! Thin shells bridging the connection factories to a message-passing
//! contract: the source adapter exposes one inbound stream of decoded frames
//! wrapped as [`Message`]s, the sink adapter accepts outbound [`Message`]s
//! and writes them as frames.
//!
//! Frames from a single connection are delivered in receipt order; there is
//! no ordering guarantee across distinct concurrent connections. Write
//! failures surface to the caller as delivery failures with no silent retry
//! (retry/backoff belongs to the surrounding messaging layer).

pub mod charset;
pub mod config;
pub mod error;
pub mod message;
pub mod sink;
pub mod source;

pub use charset::Charset;
pub use config::{load_sink_config, load_source_config, SinkConfig, SourceConfig};
pub use error::AdapterError;
pub use message::{Message, MessageMetadata};
pub use sink::{MessageSink, TcpSink};
pub use source::TcpSource;
