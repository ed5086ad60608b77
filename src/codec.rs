// Hayes AT / SMS PDU codec - shared error types and decoding primitives
//
// This module keeps the wire-level plumbing apart from the domain models. The
// AT grammar (datatypes::parameter, datatypes::message) reports `ParseError`;
// every PDU building block implements `Decodable` over a byte cursor and
// reports `PduError`.

use bytes::Buf;
use std::fmt::Write;
use std::io::Cursor;
use thiserror::Error;

/// Errors produced while parsing AT command / response text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed parameter list: {reason}")]
    MalformedParameterList { reason: String },

    #[error("Unterminated string literal in parameter list")]
    UnterminatedString,

    #[error("Unrecognized message format: {0:?}")]
    UnrecognizedMessageFormat(String),

    #[error("Not a basic response: {0:?}")]
    InvalidBasicResponse(String),
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedParameterList {
            reason: reason.into(),
        }
    }
}

/// Errors produced while decoding SMS PDUs and their user data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PduError {
    #[error("Truncated PDU: ran out of data while reading {field}")]
    TruncatedPdu { field: &'static str },

    #[error("No user data encoding resolvable for DCS {0:#04x} and no fallback given")]
    UnresolvableEncoding(u8),

    #[error("Invalid hex payload: {0}")]
    InvalidHex(String),

    #[error("Character {0:?} is not representable in the GSM 7-bit default alphabet")]
    UnencodableCharacter(char),

    #[error("Invalid UCS-2 payload")]
    InvalidUcs2,

    #[error("Invalid timestamp {field}: {value:#04x}")]
    InvalidTimestamp { field: &'static str, value: u8 },

    #[error("Invalid SMS status line: {0:?}")]
    InvalidStatusLine(String),

    #[error("Reserved message type indicator: {0:#04b}")]
    ReservedMessageType(u8),

    #[error("Status line parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Trait for PDU building blocks that can be read from a byte cursor
pub trait Decodable: Sized {
    /// Decode this value, advancing the cursor past it
    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, PduError>;
}

/// Decode a single byte
pub fn decode_u8(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u8, PduError> {
    if buf.remaining() < 1 {
        return Err(PduError::TruncatedPdu { field });
    }
    Ok(buf.get_u8())
}

/// Decode exactly `len` bytes
pub fn decode_bytes(
    buf: &mut Cursor<&[u8]>,
    len: usize,
    field: &'static str,
) -> Result<Vec<u8>, PduError> {
    if buf.remaining() < len {
        return Err(PduError::TruncatedPdu { field });
    }
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

/// Decode a hex-digit string (either case) into bytes
pub fn decode_hex(text: &str) -> Result<Vec<u8>, PduError> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(PduError::InvalidHex(format!(
            "odd number of hex digits ({})",
            text.len()
        )));
    }

    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = hex_value(pair[0]);
            let low = hex_value(pair[1]);
            match (high, low) {
                (Some(high), Some(low)) => Ok((high << 4) | low),
                _ => Err(PduError::InvalidHex(format!(
                    "non-hex digits {:?}",
                    String::from_utf8_lossy(pair)
                ))),
            }
        })
        .collect()
}

/// Encode bytes as upper-case hex digits
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{byte:02X}");
    }
    out
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Decode a semi-octet swapped decimal pair, e.g. the octet `0x21` reads as `12`
pub fn decode_semi_octet(value: u8, field: &'static str) -> Result<u8, PduError> {
    let tens = value & 0x0F;
    let units = value >> 4;
    if tens > 9 || units > 9 {
        return Err(PduError::InvalidTimestamp { field, value });
    }
    Ok(tens * 10 + units)
}
