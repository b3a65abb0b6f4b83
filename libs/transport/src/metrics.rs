//! Throughput counters.
//!
//! A lock-free sidecar: connection tasks bump shared atomic counters, and an
//! optional independent reporter task periodically reads them and logs rates.
//! Entirely outside the framing hot path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

/// Shared frame/byte counters for one factory.
#[derive(Clone, Debug, Default)]
pub struct ThroughputTracker {
    frames_sent: Arc<AtomicU64>,
    frames_received: Arc<AtomicU64>,
    bytes_sent: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl ThroughputTracker {
    /// Create a tracker with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sent frame of `bytes` payload bytes.
    #[inline]
    pub fn record_sent(&self, bytes: usize) {
        self.frames_sent.fetch_add(1, Ordering::Release);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Release);
    }

    /// Record one received frame of `bytes` payload bytes.
    #[inline]
    pub fn record_received(&self, bytes: usize) {
        self.frames_received.fetch_add(1, Ordering::Release);
        self.bytes_received
            .fetch_add(bytes as u64, Ordering::Release);
    }

    /// Record one fatal per-connection error.
    #[inline]
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Release);
    }

    /// Current counter values.
    pub fn snapshot(&self) -> ThroughputSnapshot {
        ThroughputSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Acquire),
            frames_received: self.frames_received.load(Ordering::Acquire),
            bytes_sent: self.bytes_sent.load(Ordering::Acquire),
            bytes_received: self.bytes_received.load(Ordering::Acquire),
            errors: self.errors.load(Ordering::Acquire),
        }
    }

    /// Spawn an independent task logging per-interval deltas.
    ///
    /// Runs until the returned handle is aborted.
    pub fn spawn_reporter(&self, interval: Duration) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut previous = tracker.snapshot();
            // First tick fires immediately; skip it so deltas cover a full
            // interval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let current = tracker.snapshot();
                info!(
                    frames_in = current.frames_received - previous.frames_received,
                    frames_out = current.frames_sent - previous.frames_sent,
                    bytes_in = current.bytes_received - previous.bytes_received,
                    bytes_out = current.bytes_sent - previous.bytes_sent,
                    errors = current.errors - previous.errors,
                    interval_secs = interval.as_secs_f64(),
                    "throughput"
                );
                previous = current;
            }
        })
    }
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThroughputSnapshot {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub errors: u64,
}
