//! Listening connection factory.
//!
//! Owns the TCP listener, the accept loop, and one task per accepted
//! connection. Each connection gets its own `FrameDecoder`; decoded frames
//! flow into a single bounded channel in per-connection receipt order. No
//! ordering is guaranteed across distinct connections.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::connection::FramedConnection;
use crate::error::Result;
use crate::metrics::ThroughputTracker;
use crate::TransportError;

/// One decoded inbound frame with its connection metadata.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    /// Decoded frame payload (delimiters/length prefix stripped).
    pub payload: Bytes,
    /// Remote address of the connection the frame arrived on.
    pub peer_addr: SocketAddr,
    /// Reverse-DNS hostname of the peer, when `reverse_lookup` is enabled
    /// and resolution succeeded.
    pub peer_host: Option<String>,
}

/// Listening factory: accepts connections and decodes inbound frames.
pub struct TcpServerFactory {
    config: Arc<ServerConfig>,
    state: Mutex<ServerState>,
    tracker: ThroughputTracker,
}

struct ServerState {
    /// Dropped on `stop()` so the inbound channel closes once the last
    /// connection task unwinds.
    sender: Option<mpsc::Sender<InboundFrame>>,
    running: Option<RunningServer>,
}

struct RunningServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl TcpServerFactory {
    /// Create a factory and the receiving end of its inbound frame channel.
    ///
    /// The factory does not listen until [`Self::start`] is called.
    pub fn new(config: ServerConfig) -> Result<(Self, mpsc::Receiver<InboundFrame>)> {
        config.validate()?;
        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let factory = Self {
            config: Arc::new(config),
            state: Mutex::new(ServerState {
                sender: Some(sender),
                running: None,
            }),
            tracker: ThroughputTracker::new(),
        };
        Ok((factory, receiver))
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Idempotent: calling while already started is a no-op that returns the
    /// previously bound address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let mut state = self.state.lock().await;
        if let Some(running) = &state.running {
            debug!(addr = %running.local_addr, "server factory already started");
            return Ok(running.local_addr);
        }
        let Some(sender) = state.sender.clone() else {
            // stop() has already run; the inbound channel is gone.
            return Err(TransportError::Closed);
        };

        let listener = TcpListener::bind(self.config.bind_addr())
            .await
            .map_err(|e| {
                TransportError::connect_with_source(
                    format!("failed to bind listener on {}", self.config.bind_addr()),
                    Some(self.config.bind_addr()),
                    e,
                )
            })?;
        let local_addr = listener.local_addr()?;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.config),
            sender,
            shutdown_rx,
            self.tracker.clone(),
        ));

        info!(addr = %local_addr, encoding = %self.config.encoding, "TCP server factory listening");
        state.running = Some(RunningServer {
            local_addr,
            shutdown,
            accept_task,
        });
        Ok(local_addr)
    }

    /// Close the listener and every open connection.
    ///
    /// In-flight decodes terminate with clean end-of-stream semantics.
    /// Idempotent.
    pub async fn stop(&self) {
        let running = {
            let mut state = self.state.lock().await;
            state.sender = None;
            state.running.take()
        };
        let Some(running) = running else {
            return;
        };

        // Per-connection tasks watch the same channel and unwind on signal.
        let _ = running.shutdown.send(true);
        if let Err(e) = running.accept_task.await {
            if !e.is_cancelled() {
                warn!(error = %e, "accept loop ended abnormally");
            }
        }
        info!(addr = %running.local_addr, "TCP server factory stopped");
    }

    /// Bound address, when started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.state
            .lock()
            .await
            .running
            .as_ref()
            .map(|r| r.local_addr)
    }

    /// Shared throughput counters for this factory.
    pub fn tracker(&self) -> &ThroughputTracker {
        &self.tracker
    }
}

/// Accept connections until shutdown; one independent task per connection.
async fn accept_loop(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    sender: mpsc::Sender<InboundFrame>,
    mut shutdown: watch::Receiver<bool>,
    tracker: ThroughputTracker,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("accept loop shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer_addr)) => {
                        debug!(peer = %peer_addr, "accepted connection");
                        tokio::spawn(handle_connection(
                            stream,
                            peer_addr,
                            Arc::clone(&config),
                            sender.clone(),
                            shutdown.clone(),
                            tracker.clone(),
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }
}

/// Decode frames from one connection until close, error, or shutdown.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<ServerConfig>,
    sender: mpsc::Sender<InboundFrame>,
    mut shutdown: watch::Receiver<bool>,
    tracker: ThroughputTracker,
) {
    if config.nodelay {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(peer = %peer_addr, error = %e, "failed to set TCP_NODELAY");
        }
    }

    // Resolved once per connection; a failed lookup only costs the metadata.
    let peer_host = if config.reverse_lookup {
        resolve_peer_host(peer_addr).await
    } else {
        None
    };

    let mut connection = FramedConnection::new(
        stream,
        peer_addr,
        config.encoding,
        config.max_frame_size,
        config.socket_timeout,
    );

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!(peer = %peer_addr, "connection task shutting down");
                break;
            }
            outcome = connection.read_frame() => {
                match outcome {
                    Ok(Some(payload)) => {
                        tracker.record_received(payload.len());
                        let frame = InboundFrame {
                            payload,
                            peer_addr,
                            peer_host: peer_host.clone(),
                        };
                        if sender.send(frame).await.is_err() {
                            debug!(peer = %peer_addr, "downstream receiver dropped");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!(peer = %peer_addr, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        warn!(
                            peer = %peer_addr,
                            error = %e,
                            category = e.category(),
                            "fatal error on connection, dropping it"
                        );
                        tracker.record_error();
                        break;
                    }
                }
            }
        }
    }
}

/// Reverse-DNS lookup on the blocking pool; never blocks a decode path.
async fn resolve_peer_host(peer_addr: SocketAddr) -> Option<String> {
    let ip = peer_addr.ip();
    match tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await {
        Ok(Ok(host)) => Some(host),
        Ok(Err(e)) => {
            debug!(peer = %peer_addr, error = %e, "reverse lookup failed");
            None
        }
        Err(e) => {
            debug!(peer = %peer_addr, error = %e, "reverse lookup task failed");
            None
        }
    }
}
