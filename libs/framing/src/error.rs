//! Framing Error Types
//!
//! Protocol-violation and I/O failures raised while encoding or decoding
//! frames. A clean peer close with no partial frame pending is not an error
//! and is modeled as `Ok(None)` by the decode operations.

use thiserror::Error;

/// Result type alias for framing operations.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Fatal framing failure on a single connection.
///
/// Every variant is fatal to the connection it occurred on; none affects
/// sibling connections of the same factory.
#[derive(Error, Debug)]
pub enum FrameError {
    /// A declared or accumulated frame exceeds the permitted size.
    ///
    /// Exists specifically to bound memory use against malicious or
    /// malformed peers.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },

    /// The stream ended while a frame was still being assembled.
    #[error("stream closed mid-frame after {received} buffered bytes")]
    Truncated { received: usize },

    /// Underlying socket read/write failure.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        source: std::io::Error,
    },
}

impl FrameError {
    /// Create a frame-too-large error.
    pub fn frame_too_large(size: usize, limit: usize) -> Self {
        Self::FrameTooLarge { size, limit }
    }

    /// Create a truncated-frame error.
    pub fn truncated(received: usize) -> Self {
        Self::Truncated { received }
    }

    /// Whether the failure indicates a misbehaving peer (as opposed to a
    /// transport-level fault).
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            FrameError::FrameTooLarge { .. } | FrameError::Truncated { .. }
        )
    }

    /// Error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            FrameError::FrameTooLarge { .. } => "frame_too_large",
            FrameError::Truncated { .. } => "truncated",
            FrameError::Io { .. } => "io",
        }
    }
}

impl From<std::io::Error> for FrameError {
    fn from(error: std::io::Error) -> Self {
        FrameError::Io {
            message: error.to_string(),
            source: error,
        }
    }
}
