//! Byte/text conversion policy for message payloads.
//!
//! The wire carries bytes; the charset only governs the optional text view
//! of a payload. UTF-8 is the default. Invalid bytes are an error, never a
//! lossy substitution.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Supported payload charsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "us-ascii", alias = "ascii")]
    UsAscii,
}

impl Charset {
    /// Decode payload bytes into text under this charset.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, AdapterError> {
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| AdapterError::charset(format!("payload is not valid UTF-8: {}", e))),
            Charset::UsAscii => {
                if !bytes.is_ascii() {
                    return Err(AdapterError::charset("payload is not valid US-ASCII"));
                }
                // ASCII is a UTF-8 subset; this cannot fail after the check.
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| AdapterError::charset(e.to_string()))
            }
        }
    }

    /// Encode text into payload bytes under this charset.
    pub fn encode(&self, text: &str) -> Result<Bytes, AdapterError> {
        match self {
            Charset::Utf8 => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Charset::UsAscii => {
                if !text.is_ascii() {
                    return Err(AdapterError::charset("text is not valid US-ASCII"));
                }
                Ok(Bytes::copy_from_slice(text.as_bytes()))
            }
        }
    }

    /// Canonical name of this charset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::UsAscii => "us-ascii",
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Charset {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" => Ok(Charset::UsAscii),
            other => Err(AdapterError::charset(format!(
                "unsupported charset '{}'",
                other
            ))),
        }
    }
}
