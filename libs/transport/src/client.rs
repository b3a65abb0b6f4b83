//! Dialing connection factory.
//!
//! Establishes outbound framed connections to a configured target. In
//! single-use mode every frame travels on a fresh connection that is shut
//! down after the write; otherwise one connection is kept and reused across
//! sends until a write fails or [`TcpClientFactory::close`] is called.
//!
//! Sends on a shared factory are serialized by the internal connection lock;
//! write failures surface to the caller with no automatic retry.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::connection::FramedConnection;
use crate::error::Result;
use crate::metrics::ThroughputTracker;
use crate::TransportError;

/// Dialing factory: frames and writes outbound payloads.
pub struct TcpClientFactory {
    config: Arc<ClientConfig>,
    connection: Mutex<Option<FramedConnection>>,
    tracker: ThroughputTracker,
}

impl TcpClientFactory {
    /// Create a factory for the configured target. No socket is opened
    /// until the first send (or an explicit [`Self::open_connection`]).
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            connection: Mutex::new(None),
            tracker: ThroughputTracker::new(),
        })
    }

    /// Establish one outbound connection to the configured target.
    pub async fn open_connection(&self) -> Result<FramedConnection> {
        let remote = self.config.remote_addr();

        let stream = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(&remote),
        )
        .await
        .map_err(|_| {
            TransportError::timeout("connect", self.config.connect_timeout.as_millis() as u64)
        })?
        .map_err(|e| {
            TransportError::connect_with_source(
                format!("failed to connect to {}", remote),
                Some(remote.clone()),
                e,
            )
        })?;

        if self.config.nodelay {
            if let Err(e) = stream.set_nodelay(true) {
                warn!(remote = %remote, error = %e, "failed to set TCP_NODELAY");
            }
        }

        let peer_addr = stream.peer_addr().map_err(|e| {
            TransportError::connect_with_source("failed to get peer address", Some(remote), e)
        })?;

        debug!(peer = %peer_addr, encoding = %self.config.encoding, "connected");
        Ok(FramedConnection::new(
            stream,
            peer_addr,
            self.config.encoding,
            self.config.max_frame_size,
            self.config.socket_timeout,
        ))
    }

    /// Frame `payload` and write it to the target.
    ///
    /// Single-use mode opens a fresh connection and shuts it down after the
    /// write. Otherwise the stored connection is reused; a failed write
    /// discards it and surfaces the error (the next send dials again).
    pub async fn send(&self, payload: &[u8]) -> Result<()> {
        if self.config.single_use {
            let mut connection = self.open_connection().await?;
            connection.send_frame(payload).await?;
            if let Err(e) = connection.shutdown().await {
                debug!(error = %e, "error shutting down single-use connection");
            }
            self.tracker.record_sent(payload.len());
            return Ok(());
        }

        let mut guard = self.connection.lock().await;
        if guard.is_none() {
            *guard = Some(self.open_connection().await?);
        }

        // Checked above; the lock is held so the slot cannot empty under us.
        let Some(connection) = guard.as_mut() else {
            return Err(TransportError::Closed);
        };

        match connection.send_frame(payload).await {
            Ok(()) => {
                self.tracker.record_sent(payload.len());
                Ok(())
            }
            Err(e) => {
                warn!(
                    peer = %connection.peer_addr(),
                    error = %e,
                    "write failed, discarding connection"
                );
                self.tracker.record_error();
                *guard = None;
                Err(e)
            }
        }
    }

    /// Close the reused connection, if any. The next send dials again.
    pub async fn close(&self) {
        let mut guard = self.connection.lock().await;
        if let Some(mut connection) = guard.take() {
            if let Err(e) = connection.shutdown().await {
                debug!(error = %e, "error shutting down connection");
            }
            debug!(peer = %connection.peer_addr(), "closed connection");
        }
    }

    /// Whether a reused connection is currently held.
    pub fn is_connected(&self) -> bool {
        match self.connection.try_lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => true, // a send is in progress on it
        }
    }

    /// Shared throughput counters for this factory.
    pub fn tracker(&self) -> &ThroughputTracker {
        &self.tracker
    }

    /// Target configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for TcpClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpClientFactory")
            .field("remote", &self.config.remote_addr())
            .field("encoding", &self.config.encoding)
            .field("single_use", &self.config.single_use)
            .finish()
    }
}
