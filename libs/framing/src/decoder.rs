//! Frame boundary detection.
//!
//! A [`FrameDecoder`] is owned by exactly one connection and consumes its
//! byte stream until one full frame boundary is recognized. Decoding is
//! split in two layers: [`FrameDecoder::try_decode`] scans the internal
//! buffer without touching I/O (useful for tests and for callers that manage
//! their own reads), and [`FrameDecoder::read_frame`] pumps an `AsyncRead`
//! through it until a frame completes or the stream ends.
//!
//! End-of-stream semantics:
//! - stream ends with an empty buffer: clean close, `Ok(None)`;
//! - stream ends mid-frame: [`FrameError::Truncated`];
//! - `Raw` mode: end-of-stream completes the connection's single frame, and
//!   every subsequent call returns `Ok(None)` immediately.

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::encoding::{Encoding, ETX, STX};
use crate::error::{FrameError, Result};
use crate::DEFAULT_MAX_FRAME_SIZE;

/// Initial read-buffer capacity; grows on demand up to the frame limit.
const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Per-connection frame decoder for one [`Encoding`] mode.
#[derive(Debug)]
pub struct FrameDecoder {
    encoding: Encoding,
    max_frame_size: usize,
    buffer: BytesMut,
    /// Set once a `Raw` connection has delivered its single frame.
    finished: bool,
}

impl FrameDecoder {
    /// Create a decoder with an explicit frame size bound.
    pub fn new(encoding: Encoding, max_frame_size: usize) -> Self {
        Self {
            encoding,
            max_frame_size,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            finished: false,
        }
    }

    /// Create a decoder with [`DEFAULT_MAX_FRAME_SIZE`].
    pub fn with_default_limit(encoding: Encoding) -> Self {
        Self::new(encoding, DEFAULT_MAX_FRAME_SIZE)
    }

    /// The framing mode this decoder recognizes.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Configured upper bound on one decoded frame.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Bytes currently buffered toward the next frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Return the decoder to its initial state, discarding buffered bytes.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.finished = false;
    }

    /// Append raw bytes for sans-I/O decoding via [`Self::try_decode`].
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Scan the internal buffer for one complete frame.
    ///
    /// Returns the frame payload with delimiters/length prefix stripped, or
    /// `Ok(None)` when more bytes are needed. `Raw` never completes here
    /// (its frame ends at connection close, handled by [`Self::read_frame`]).
    pub fn try_decode(&mut self) -> Result<Option<Bytes>> {
        match self.encoding {
            Encoding::Raw => Ok(None),
            Encoding::Crlf | Encoding::Lf | Encoding::Null => self.decode_terminated(),
            Encoding::StxEtx => self.decode_stx_etx(),
            Encoding::L1 | Encoding::L2 | Encoding::L4 => self.decode_length_prefixed(),
        }
    }

    /// Whether a `Raw` connection has already delivered its single frame.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Read from `reader` until one full frame is decoded.
    ///
    /// `Ok(None)` signals a clean end of stream (soft end-of-stream): either
    /// the peer closed before any byte of the next frame, or a `Raw`
    /// connection already delivered its single frame.
    pub async fn read_frame<R>(&mut self, reader: &mut R) -> Result<Option<Bytes>>
    where
        R: AsyncRead + Unpin,
    {
        if self.finished {
            return Ok(None);
        }

        loop {
            if let Some(frame) = self.try_decode()? {
                trace!(
                    encoding = %self.encoding,
                    bytes = frame.len(),
                    "decoded frame"
                );
                return Ok(Some(frame));
            }

            if self.read_more(reader).await? == 0 {
                return self.end_of_stream();
            }
        }
    }

    /// Perform one read into the accumulation buffer.
    ///
    /// Returns the number of bytes read; 0 means end of stream, to be
    /// resolved via [`Self::end_of_stream`]. Exposed so drivers that need a
    /// deadline per read (idle timeouts) can pump the decoder themselves
    /// with [`Self::try_decode`].
    pub async fn read_more<R>(&mut self, reader: &mut R) -> Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        let read = reader.read_buf(&mut self.buffer).await?;

        // Raw has no in-stream boundary, so the memory bound is enforced on
        // accumulation instead.
        if read > 0 && self.encoding.is_raw() && self.buffer.len() > self.max_frame_size {
            return Err(FrameError::frame_too_large(
                self.buffer.len(),
                self.max_frame_size,
            ));
        }
        Ok(read)
    }

    /// Resolve end-of-stream into a clean close, the `Raw` single frame, or
    /// a truncation error.
    pub fn end_of_stream(&mut self) -> Result<Option<Bytes>> {
        if self.encoding.is_raw() {
            self.finished = true;
            if self.buffer.is_empty() {
                return Ok(None);
            }
            let frame = self.buffer.split().freeze();
            trace!(bytes = frame.len(), "raw connection closed, frame complete");
            return Ok(Some(frame));
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }
        Err(FrameError::truncated(self.buffer.len()))
    }

    fn decode_terminated(&mut self) -> Result<Option<Bytes>> {
        // terminator() is always Some for the terminated variants
        let terminator = self.encoding.terminator().unwrap_or_default();

        if let Some(pos) = find(&self.buffer, terminator) {
            if pos > self.max_frame_size {
                return Err(FrameError::frame_too_large(pos, self.max_frame_size));
            }
            let mut frame = self.buffer.split_to(pos + terminator.len());
            frame.truncate(pos);
            return Ok(Some(frame.freeze()));
        }

        // Everything buffered belongs to the current frame; allow for a
        // partially received terminator before flagging the peer.
        if self.buffer.len() > self.max_frame_size + terminator.len() {
            return Err(FrameError::frame_too_large(
                self.buffer.len(),
                self.max_frame_size,
            ));
        }
        Ok(None)
    }

    fn decode_stx_etx(&mut self) -> Result<Option<Bytes>> {
        // Bytes ahead of the start marker are line noise; drop them.
        match find(&self.buffer, &[STX]) {
            Some(0) => {}
            Some(skip) => self.buffer.advance(skip),
            None => {
                self.buffer.clear();
                return Ok(None);
            }
        }

        if let Some(len) = find(&self.buffer[1..], &[ETX]) {
            if len > self.max_frame_size {
                return Err(FrameError::frame_too_large(len, self.max_frame_size));
            }
            let mut frame = self.buffer.split_to(len + 2);
            frame.advance(1);
            frame.truncate(len);
            return Ok(Some(frame.freeze()));
        }

        if self.buffer.len() - 1 > self.max_frame_size {
            return Err(FrameError::frame_too_large(
                self.buffer.len() - 1,
                self.max_frame_size,
            ));
        }
        Ok(None)
    }

    fn decode_length_prefixed(&mut self) -> Result<Option<Bytes>> {
        // prefix_len() is always Some for the length-prefixed variants
        let width = self.encoding.prefix_len().unwrap_or_default();
        if self.buffer.len() < width {
            return Ok(None);
        }

        let declared = match width {
            1 => self.buffer[0] as usize,
            2 => u16::from_be_bytes([self.buffer[0], self.buffer[1]]) as usize,
            _ => u32::from_be_bytes([
                self.buffer[0],
                self.buffer[1],
                self.buffer[2],
                self.buffer[3],
            ]) as usize,
        };

        // Reject before buffering the payload: the declared length is the
        // peer's claim and must not drive allocation past the bound.
        if declared > self.max_frame_size {
            return Err(FrameError::frame_too_large(declared, self.max_frame_size));
        }

        if self.buffer.len() < width + declared {
            return Ok(None);
        }

        let mut frame = self.buffer.split_to(width + declared);
        frame.advance(width);
        Ok(Some(frame.freeze()))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() == 1 {
        let byte = needle[0];
        return haystack.iter().position(|b| *b == byte);
    }
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
