//! Framed connection wrapper.
//!
//! One live TCP socket paired with its exclusively-owned encoder/decoder and
//! activity counters. Owned by exactly one task; no cross-connection state.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use framing::{Encoding, FrameDecoder, FrameEncoder};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::Result;
use crate::TransportError;

/// A TCP connection with framing applied in both directions.
pub struct FramedConnection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    encoder: FrameEncoder,
    decoder: FrameDecoder,
    socket_timeout: Option<Duration>,
    connected_at: Instant,
    last_activity: Instant,
    frames_sent: u64,
    frames_received: u64,
    bytes_sent: u64,
    bytes_received: u64,
}

impl FramedConnection {
    /// Wrap an established socket with a fresh encoder/decoder pair.
    pub fn new(
        stream: TcpStream,
        peer_addr: SocketAddr,
        encoding: Encoding,
        max_frame_size: usize,
        socket_timeout: Option<Duration>,
    ) -> Self {
        let now = Instant::now();
        Self {
            stream,
            peer_addr,
            encoder: FrameEncoder::new(encoding),
            decoder: FrameDecoder::new(encoding, max_frame_size),
            socket_timeout,
            connected_at: now,
            last_activity: now,
            frames_sent: 0,
            frames_received: 0,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Remote address of this connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Encode `payload` and write the resulting frame.
    pub async fn send_frame(&mut self, payload: &[u8]) -> Result<()> {
        let frame = self.encoder.encode(payload)?;

        self.stream.write_all(&frame).await.map_err(|e| {
            TransportError::connection_with_source(
                "failed to write frame",
                Some(self.peer_addr),
                e,
            )
        })?;
        self.stream.flush().await.map_err(|e| {
            TransportError::connection_with_source("failed to flush stream", Some(self.peer_addr), e)
        })?;

        self.frames_sent += 1;
        self.bytes_sent += frame.len() as u64;
        self.last_activity = Instant::now();

        trace!(
            peer = %self.peer_addr,
            bytes = payload.len(),
            total_sent = self.frames_sent,
            "sent frame"
        );
        Ok(())
    }

    /// Read the next inbound frame.
    ///
    /// `Ok(None)` is a clean close: the peer closed with no partial frame
    /// pending, or the idle timeout elapsed between frames. The timeout is
    /// per read, not per frame: a slow peer that keeps bytes flowing never
    /// trips it. An idle timeout that fires mid-frame is a truncation, same
    /// as a mid-frame close.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>> {
        let outcome = self.next_frame().await;

        match outcome {
            Ok(Some(frame)) => {
                self.frames_received += 1;
                self.bytes_received += frame.len() as u64;
                self.last_activity = Instant::now();
                Ok(Some(frame))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Pump the decoder with one idle deadline per read.
    async fn next_frame(&mut self) -> framing::Result<Option<Bytes>> {
        let Some(limit) = self.socket_timeout else {
            return self.decoder.read_frame(&mut self.stream).await;
        };

        if self.decoder.is_finished() {
            return Ok(None);
        }

        loop {
            if let Some(frame) = self.decoder.try_decode()? {
                return Ok(Some(frame));
            }

            match tokio::time::timeout(limit, self.decoder.read_more(&mut self.stream)).await {
                Ok(Ok(0)) => return self.decoder.end_of_stream(),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e),
                Err(_elapsed) => {
                    // No bytes within the idle window; resolve the same way
                    // as a peer close. Mid-frame this is a truncation.
                    let pending = self.decoder.buffered();
                    if pending > 0 {
                        debug!(peer = %self.peer_addr, pending, "idle timeout mid-frame");
                    } else {
                        debug!(peer = %self.peer_addr, "idle timeout, closing connection");
                    }
                    return self.decoder.end_of_stream();
                }
            }
        }
    }

    /// Shut down the write half, signalling end-of-stream to the peer.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(|e| {
            TransportError::connection_with_source(
                "failed to shut down connection",
                Some(self.peer_addr),
                e,
            )
        })
    }

    /// Activity counters for this connection.
    pub fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            peer_addr: self.peer_addr,
            connected_duration: self.connected_at.elapsed(),
            idle: self.last_activity.elapsed(),
            frames_sent: self.frames_sent,
            frames_received: self.frames_received,
            bytes_sent: self.bytes_sent,
            bytes_received: self.bytes_received,
        }
    }
}

impl std::fmt::Debug for FramedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedConnection")
            .field("peer_addr", &self.peer_addr)
            .field("encoding", &self.encoder.encoding())
            .field("frames_sent", &self.frames_sent)
            .field("frames_received", &self.frames_received)
            .finish()
    }
}

/// Point-in-time counters for one connection.
#[derive(Debug, Clone)]
pub struct ConnectionStats {
    pub peer_addr: SocketAddr,
    pub connected_duration: Duration,
    pub idle: Duration,
    pub frames_sent: u64,
    pub frames_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}
