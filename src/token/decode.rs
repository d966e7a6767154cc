// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Token → source text, mirroring what a PlantUML server does with a `~1` token.

use std::fmt;
use std::io::Read;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use flate2::read::{DeflateDecoder, ZlibDecoder};

use super::TOKEN_HEADER;

// Tokens are emitted unpadded, but hand-built ones sometimes keep their `=`.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    MissingHeader,
    EmptyPayload,
    InvalidBase64 { reason: String },
    Inflate { reason: String },
    InvalidUtf8 { valid_up_to: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "token must start with '{TOKEN_HEADER}'"),
            Self::EmptyPayload => f.write_str("token payload must not be empty"),
            Self::InvalidBase64 { reason } => write!(f, "invalid base64 payload: {reason}"),
            Self::Inflate { reason } => write!(f, "failed to inflate payload: {reason}"),
            Self::InvalidUtf8 { valid_up_to } => {
                write!(f, "decoded source is not UTF-8 (valid up to byte {valid_up_to})")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

pub fn decode(token: &str) -> Result<String, DecodeError> {
    let payload = token.trim().strip_prefix(TOKEN_HEADER).ok_or(DecodeError::MissingHeader)?;
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let compressed = URL_SAFE_LENIENT
        .decode(payload)
        .map_err(|err| DecodeError::InvalidBase64 { reason: err.to_string() })?;
    let bytes = inflate(&compressed)?;

    String::from_utf8(bytes)
        .map_err(|err| DecodeError::InvalidUtf8 { valid_up_to: err.utf8_error().valid_up_to() })
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    // A raw stream can start with bytes that pass the zlib header check, so zlib is
    // only a first attempt.
    if looks_like_zlib_header(compressed) {
        if let Ok(bytes) = read_to_end(ZlibDecoder::new(compressed)) {
            return Ok(bytes);
        }
    }

    read_to_end(DeflateDecoder::new(compressed))
        .map_err(|err| DecodeError::Inflate { reason: err.to_string() })
}

fn read_to_end(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

/// RFC 1950: CM = 8, CINFO <= 7, and the first two bytes are a multiple of 31.
pub(crate) fn looks_like_zlib_header(bytes: &[u8]) -> bool {
    match bytes {
        [cmf, flg, ..] => {
            cmf & 0x0f == 8 && cmf >> 4 <= 7 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0
        }
        _ => false,
    }
}
