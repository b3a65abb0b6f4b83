//! Framing mode selection.
//!
//! A closed enum of the supported framing schemes. The variant is chosen at
//! adapter configuration time (typically parsed from a config file) and
//! shared read-only by every connection of a factory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Start-of-text marker used by [`Encoding::StxEtx`].
pub const STX: u8 = 0x02;
/// End-of-text marker used by [`Encoding::StxEtx`].
pub const ETX: u8 = 0x03;

/// Frame boundary convention for one TCP connection.
///
/// Terminator modes append a fixed byte sequence after the payload, length
/// modes prepend a big-endian unsigned payload length, `Raw` performs no
/// framing at all (the frame is the whole connection lifetime).
///
/// None of the terminator or STX/ETX modes escape in-band delimiter bytes.
/// A payload containing the delimiter corrupts framing; this is a documented
/// limitation of the wire conventions, kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Encoding {
    /// Payload terminated by `\r\n`.
    Crlf,
    /// Payload terminated by `\n`.
    Lf,
    /// Payload terminated by a single `0x00` byte.
    Null,
    /// Payload bracketed by `0x02` (STX) and `0x03` (ETX).
    StxEtx,
    /// 1-byte big-endian length prefix (payloads up to 255 bytes).
    L1,
    /// 2-byte big-endian length prefix (payloads up to 65535 bytes).
    L2,
    /// 4-byte big-endian length prefix.
    L4,
    /// No delimiter; one frame per connection, ended by the peer closing.
    Raw,
}

impl Encoding {
    /// Terminator byte sequence, for the terminator-based modes.
    pub fn terminator(&self) -> Option<&'static [u8]> {
        match self {
            Encoding::Crlf => Some(b"\r\n"),
            Encoding::Lf => Some(b"\n"),
            Encoding::Null => Some(&[0x00]),
            _ => None,
        }
    }

    /// Width of the length prefix in bytes, for the length-prefixed modes.
    pub fn prefix_len(&self) -> Option<usize> {
        match self {
            Encoding::L1 => Some(1),
            Encoding::L2 => Some(2),
            Encoding::L4 => Some(4),
            _ => None,
        }
    }

    /// Largest payload representable by this mode's length prefix.
    ///
    /// `None` for modes without a length prefix (their only bound is the
    /// decoder's configured maximum frame size).
    pub fn max_payload(&self) -> Option<usize> {
        match self {
            Encoding::L1 => Some(u8::MAX as usize),
            Encoding::L2 => Some(u16::MAX as usize),
            Encoding::L4 => Some(u32::MAX as usize),
            _ => None,
        }
    }

    /// Whether this mode delivers exactly one frame per connection.
    pub fn is_raw(&self) -> bool {
        matches!(self, Encoding::Raw)
    }

    /// Configuration spelling of this mode (`CRLF`, `L2`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Crlf => "CRLF",
            Encoding::Lf => "LF",
            Encoding::Null => "NULL",
            Encoding::StxEtx => "STXETX",
            Encoding::L1 => "L1",
            Encoding::L2 => "L2",
            Encoding::L4 => "L4",
            Encoding::Raw => "RAW",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown encoding name.
#[derive(Debug, Clone, Error)]
#[error("unknown encoding '{0}' (expected one of CRLF, LF, NULL, STXETX, L1, L2, L4, RAW)")]
pub struct InvalidEncoding(pub String);

impl FromStr for Encoding {
    type Err = InvalidEncoding;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CRLF" => Ok(Encoding::Crlf),
            "LF" => Ok(Encoding::Lf),
            "NULL" => Ok(Encoding::Null),
            "STXETX" => Ok(Encoding::StxEtx),
            "L1" => Ok(Encoding::L1),
            "L2" => Ok(Encoding::L2),
            "L4" => Ok(Encoding::L4),
            "RAW" => Ok(Encoding::Raw),
            _ => Err(InvalidEncoding(s.to_string())),
        }
    }
}
