//! Pluggable Byte-Stream Framing
//!
//! This crate converts payloads into delimited or length-prefixed byte frames
//! on write, and recognizes frame boundaries in a live byte stream on read.
//! The framing scheme is selected once per connection via [`Encoding`] and is
//! immutable afterwards; each connection owns its own [`FrameDecoder`].
//!
//! Clean end-of-stream is not an error: decode operations return `Ok(None)`
//! when the peer closes with no partial frame pending. A close mid-frame is
//! [`FrameError::Truncated`]; a frame exceeding the configured bound is
//! [`FrameError::FrameTooLarge`]. Both are fatal to the connection they
//! occurred on.

pub mod decoder;
pub mod encoder;
pub mod encoding;
pub mod error;

pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;
pub use encoding::{Encoding, InvalidEncoding};
pub use error::{FrameError, Result};

/// Default upper bound on a single decoded frame, in bytes.
///
/// Matches the historical default receive buffer of the TCP adapters this
/// crate was extracted from. Peers declaring or accumulating more than the
/// configured bound are treated as protocol violators and disconnected.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 2048;
