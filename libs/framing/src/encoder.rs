//! Frame encoding.
//!
//! Wraps an arbitrary payload with the active mode's delimiter or length
//! prefix. Encoding is stateless and symmetric with [`crate::FrameDecoder`]:
//! `decode(encode(payload)) == payload` for any payload free of the mode's
//! reserved bytes.

use bytes::{BufMut, Bytes, BytesMut};

use crate::encoding::{Encoding, ETX, STX};
use crate::error::{FrameError, Result};

/// Stateless frame encoder for one [`Encoding`] mode.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    encoding: Encoding,
}

impl FrameEncoder {
    /// Create an encoder for the given framing mode.
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// The framing mode this encoder applies.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Wrap `payload` into one wire frame.
    ///
    /// For the length-prefixed modes this fails with
    /// [`FrameError::FrameTooLarge`] when the payload length exceeds the
    /// prefix width's capacity. Terminator and STX/ETX modes perform no
    /// escaping: a payload containing the delimiter bytes corrupts framing
    /// (caller responsibility, see [`Encoding`]).
    pub fn encode(&self, payload: &[u8]) -> Result<Bytes> {
        if let Some(capacity) = self.encoding.max_payload() {
            if payload.len() > capacity {
                return Err(FrameError::frame_too_large(payload.len(), capacity));
            }
        }

        let frame = match self.encoding {
            Encoding::Raw => Bytes::copy_from_slice(payload),
            Encoding::Crlf | Encoding::Lf | Encoding::Null => {
                // terminator() is always Some for these variants
                let terminator = self.encoding.terminator().unwrap_or_default();
                let mut buf = BytesMut::with_capacity(payload.len() + terminator.len());
                buf.put_slice(payload);
                buf.put_slice(terminator);
                buf.freeze()
            }
            Encoding::StxEtx => {
                let mut buf = BytesMut::with_capacity(payload.len() + 2);
                buf.put_u8(STX);
                buf.put_slice(payload);
                buf.put_u8(ETX);
                buf.freeze()
            }
            Encoding::L1 => {
                let mut buf = BytesMut::with_capacity(payload.len() + 1);
                buf.put_u8(payload.len() as u8);
                buf.put_slice(payload);
                buf.freeze()
            }
            Encoding::L2 => {
                let mut buf = BytesMut::with_capacity(payload.len() + 2);
                buf.put_u16(payload.len() as u16);
                buf.put_slice(payload);
                buf.freeze()
            }
            Encoding::L4 => {
                let mut buf = BytesMut::with_capacity(payload.len() + 4);
                buf.put_u32(payload.len() as u32);
                buf.put_slice(payload);
                buf.freeze()
            }
        };

        Ok(frame)
    }
}
