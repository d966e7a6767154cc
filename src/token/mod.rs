// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! PlantUML token encoding.
//!
//! A token is the `~1` header followed by the URL-safe, unpadded base64 form of the
//! DEFLATE-compressed (level 9) source bytes. PlantUML servers read `~1` as "base64
//! alphabet" as opposed to the legacy custom alphabet, then inflate the payload.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

mod decode;

pub use decode::{decode, DecodeError};

/// Protocol constant announcing the base64 token variant.
pub const TOKEN_HEADER: &str = "~1";

pub const COMPRESSION_LEVEL: u32 = 9;

/// Container around the DEFLATE stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Bare DEFLATE blocks.
    #[default]
    Raw,
    /// DEFLATE wrapped in a zlib header and adler32 trailer.
    Zlib,
}

impl Framing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Zlib => "zlib",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFramingError {
    pub value: String,
}

impl fmt::Display for ParseFramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown framing '{}' (expected 'raw' or 'zlib')", self.value)
    }
}

impl std::error::Error for ParseFramingError {}

impl FromStr for Framing {
    type Err = ParseFramingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "deflate" => Ok(Self::Raw),
            "zlib" => Ok(Self::Zlib),
            _ => Err(ParseFramingError { value: s.to_owned() }),
        }
    }
}

/// `~1` followed by one or more characters from `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlantUmlToken(String);

impl PlantUmlToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token without its `~1` header.
    pub fn payload(&self) -> &str {
        &self.0[TOKEN_HEADER.len()..]
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PlantUmlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlantUmlToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTokenError {
    MissingHeader,
    EmptyPayload,
    InvalidChar { ch: char, offset: usize },
}

impl fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "token must start with '{TOKEN_HEADER}'"),
            Self::EmptyPayload => f.write_str("token payload must not be empty"),
            Self::InvalidChar { ch, offset } => {
                write!(f, "invalid token character {ch:?} at offset {offset}")
            }
        }
    }
}

impl std::error::Error for ParseTokenError {}

impl FromStr for PlantUmlToken {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload = s.strip_prefix(TOKEN_HEADER).ok_or(ParseTokenError::MissingHeader)?;
        if payload.is_empty() {
            return Err(ParseTokenError::EmptyPayload);
        }
        if let Some((idx, ch)) = payload.char_indices().find(|&(_, ch)| !is_token_char(ch)) {
            return Err(ParseTokenError::InvalidChar { ch, offset: TOKEN_HEADER.len() + idx });
        }
        Ok(Self(s.to_owned()))
    }
}

pub(crate) fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    EmptySource,
    Compress { reason: String },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySource => f.write_str("diagram source must not be empty"),
            Self::Compress { reason } => write!(f, "failed to compress diagram source: {reason}"),
        }
    }
}

impl std::error::Error for EncodingError {}

/// Source text → [`PlantUmlToken`].
///
/// Stateless apart from the framing choice; share one instance freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenEncoder {
    framing: Framing,
}

impl TokenEncoder {
    pub const fn new(framing: Framing) -> Self {
        Self { framing }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn encode(&self, source: &str) -> Result<PlantUmlToken, EncodingError> {
        if source.is_empty() {
            return Err(EncodingError::EmptySource);
        }

        let compressed = self.compress(source.as_bytes())?;

        let encoded_len = base64::encoded_len(compressed.len(), false).unwrap_or(0);
        let mut token = String::with_capacity(TOKEN_HEADER.len() + encoded_len);
        token.push_str(TOKEN_HEADER);
        URL_SAFE_NO_PAD.encode_string(&compressed, &mut token);
        Ok(PlantUmlToken(token))
    }

    /// Encodes every source in parallel; results keep the input order.
    pub fn encode_all<S>(&self, sources: &[S]) -> Vec<Result<PlantUmlToken, EncodingError>>
    where
        S: AsRef<str> + Sync,
    {
        sources.par_iter().map(|source| self.encode(source.as_ref())).collect()
    }

    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, EncodingError> {
        let level = Compression::new(COMPRESSION_LEVEL);
        let result = match self.framing {
            Framing::Raw => {
                let mut encoder = DeflateEncoder::new(Vec::new(), level);
                encoder.write_all(bytes).and_then(|()| encoder.finish())
            }
            Framing::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), level);
                encoder.write_all(bytes).and_then(|()| encoder.finish())
            }
        };
        result.map_err(|err| EncodingError::Compress { reason: err.to_string() })
    }
}

/// Encodes `source` with the default (raw DEFLATE) framing.
pub fn encode(source: &str) -> Result<PlantUmlToken, EncodingError> {
    TokenEncoder::default().encode(source)
}
