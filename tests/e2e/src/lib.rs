//! End-to-end test harness.
//!
//! Shared fixtures for exercising the framing, transport, and adapter layers
//! together over real loopback sockets.

use std::net::SocketAddr;

use anyhow::Result;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Install a test subscriber once per process. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A raw TCP server that collects the exact bytes each connection delivers.
///
/// Used to observe sink output on the wire without any decoding in the way.
/// One `Vec<u8>` is emitted per connection, after that connection closes.
pub struct RawCollector {
    pub addr: SocketAddr,
    pub connections: mpsc::UnboundedReceiver<Vec<u8>>,
    accept_task: JoinHandle<()>,
}

impl RawCollector {
    /// Bind on an ephemeral loopback port and start collecting.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    if stream.read_to_end(&mut buf).await.is_ok() {
                        let _ = tx.send(buf);
                    }
                });
            }
        });

        Ok(Self {
            addr,
            connections: rx,
            accept_task,
        })
    }

    /// Bytes from the next connection to finish, in arrival order.
    pub async fn next_connection(&mut self) -> Option<Vec<u8>> {
        self.connections.recv().await
    }

    pub fn stop(self) {
        self.accept_task.abort();
    }
}
