//! Transport Error Types
//!
//! Failures raised by the connection factories. Framing violations are
//! wrapped so callers can keep classifying them with
//! [`framing::FrameError::is_protocol_violation`].

use std::net::SocketAddr;

use framing::FrameError;
use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Main transport error type.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Outbound socket could not be established. Surfaced synchronously to
    /// the caller attempting the send; no automatic retry is performed.
    #[error("Connect error: {message} (remote: {remote_addr:?})")]
    Connect {
        message: String,
        remote_addr: Option<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Established connection failed mid-use (broken pipe, reset).
    #[error("Connection error: {message} (remote: {remote_addr:?})")]
    Connection {
        message: String,
        remote_addr: Option<SocketAddr>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid factory configuration, rejected at construction.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// An operation exceeded its deadline.
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Framing violation on one connection (fatal to that connection only).
    #[error("Framing error: {0}")]
    Frame(#[from] FrameError),

    /// Generic I/O error.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        source: std::io::Error,
    },

    /// The factory has been stopped.
    #[error("Factory closed")]
    Closed,
}

impl TransportError {
    /// Create a connect error.
    pub fn connect(message: impl Into<String>, remote_addr: Option<String>) -> Self {
        Self::Connect {
            message: message.into(),
            remote_addr,
            source: None,
        }
    }

    /// Create a connect error with source.
    pub fn connect_with_source(
        message: impl Into<String>,
        remote_addr: Option<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connect {
            message: message.into(),
            remote_addr,
            source: Some(Box::new(source)),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>, remote_addr: Option<SocketAddr>) -> Self {
        Self::Connection {
            message: message.into(),
            remote_addr,
            source: None,
        }
    }

    /// Create a connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        remote_addr: Option<SocketAddr>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            remote_addr,
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Whether this error ends the connection it occurred on.
    pub fn is_connection_fatal(&self) -> bool {
        match self {
            TransportError::Connection { .. } => true,
            TransportError::Frame(e) => e.is_protocol_violation(),
            TransportError::Io { .. } => true,
            TransportError::Closed => true,
            _ => false,
        }
    }

    /// Get error category for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Connect { .. } => "connect",
            TransportError::Connection { .. } => "connection",
            TransportError::Configuration { .. } => "configuration",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Frame(e) => e.category(),
            TransportError::Io { .. } => "io",
            TransportError::Closed => "closed",
        }
    }
}

/// Convert standard I/O errors to transport errors.
impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        TransportError::Io {
            message: error.to_string(),
            source: error,
        }
    }
}
