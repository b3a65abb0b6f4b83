//! Adapter Error Types

use framing::FrameError;
use transport::TransportError;

/// Failures surfaced to users of the source/sink adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Message too large: {size}B exceeds limit of {limit}B")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("Adapter closed")]
    Closed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Charset error: {0}")]
    Charset(String),
}

impl AdapterError {
    /// Check if the caller may reasonably try again with a new connection.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AdapterError::ConnectionFailed(_) | AdapterError::SendFailed(_)
        )
    }

    /// Check if this is a connection-related error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, AdapterError::ConnectionFailed(_))
    }

    /// Create an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        AdapterError::InvalidConfig(msg.into())
    }

    /// Create a charset error.
    pub fn charset(msg: impl Into<String>) -> Self {
        AdapterError::Charset(msg.into())
    }
}

impl From<TransportError> for AdapterError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Connect { .. } | TransportError::Timeout { .. } => {
                AdapterError::ConnectionFailed(error.to_string())
            }
            TransportError::Configuration { .. } => {
                AdapterError::InvalidConfig(error.to_string())
            }
            TransportError::Frame(FrameError::FrameTooLarge { size, limit }) => {
                AdapterError::MessageTooLarge { size, limit }
            }
            TransportError::Closed => AdapterError::Closed,
            other => AdapterError::SendFailed(other.to_string()),
        }
    }
}
