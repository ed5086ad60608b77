// ABOUTME: User-data text encodings: packed GSM 7-bit default alphabet and UCS-2
// ABOUTME: Closed set of strategies with hex-level encode/decode plus septet packing primitives

use crate::codec::{PduError, decode_hex, encode_hex};
use std::fmt;

/// GSM 03.38 default alphabet, indexed by septet value
const GSM7_BASIC: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\x1b', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à', //
];

/// Extension table, reached through the escape septet
const GSM7_EXTENSION: [(u8, char); 10] = [
    (0x0A, '\x0C'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

const ESCAPE: u8 = 0x1B;
const CARRIAGE_RETURN: u8 = 0x0D;

/// A user-data character encoding
///
/// Selected from the data coding scheme by [`UserDataEncoding::from_dcs`].
/// Both variants encode to and decode from upper-case hex text, the form in
/// which user data travels inside AT responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserDataEncoding {
    /// GSM 7-bit default alphabet, packed low-order bit first
    Gsm7,
    /// UCS-2, big-endian 16 bits per code unit
    Ucs2,
}

impl UserDataEncoding {
    /// Resolves the encoding from a data coding scheme byte (`dcs & 0b1100`)
    ///
    /// Returns `None` for 8-bit data and reserved alphabets; callers must
    /// supply a fallback in that case.
    pub fn from_dcs(dcs: u8) -> Option<Self> {
        match dcs & 0b1100 {
            0b0000 => Some(UserDataEncoding::Gsm7),
            0b1000 => Some(UserDataEncoding::Ucs2),
            _ => None,
        }
    }

    /// Decode a hex payload into text
    pub fn decode(&self, hex: &str) -> Result<String, PduError> {
        let bytes = decode_hex(hex)?;
        match self {
            UserDataEncoding::Gsm7 => {
                let count = bytes.len() * 8 / 7;
                let mut septets = unpack_septets(&bytes, count);
                match count % 8 {
                    // A CR in the final seven spare bits is padding, not text
                    0 if septets.last() == Some(&CARRIAGE_RETURN) => {
                        septets.pop();
                    }
                    // A wanted CR ending on an octet boundary is sent twice
                    1 if septets.ends_with(&[CARRIAGE_RETURN, CARRIAGE_RETURN]) => {
                        septets.pop();
                    }
                    _ => {}
                }
                Ok(septets_to_text(&septets))
            }
            UserDataEncoding::Ucs2 => ucs2_to_text(&bytes),
        }
    }

    /// Encode text into an upper-case hex payload
    pub fn encode(&self, text: &str) -> Result<String, PduError> {
        match self {
            UserDataEncoding::Gsm7 => {
                let mut septets = text_to_septets(text)?;
                match septets.len() % 8 {
                    7 => septets.push(CARRIAGE_RETURN),
                    // TS 23.038: a trailing CR on an octet boundary would read as padding
                    0 if septets.last() == Some(&CARRIAGE_RETURN) => {
                        septets.push(CARRIAGE_RETURN)
                    }
                    _ => {}
                }
                Ok(encode_hex(&pack_septets(&septets)))
            }
            UserDataEncoding::Ucs2 => Ok(encode_hex(&text_to_ucs2(text))),
        }
    }

    /// Number of octets occupied by user data of the given UDL
    ///
    /// UDL counts septets for GSM 7-bit and octets for UCS-2.
    pub fn octet_len(&self, udl: u8) -> usize {
        match self {
            UserDataEncoding::Gsm7 => (udl as usize * 7).div_ceil(8),
            UserDataEncoding::Ucs2 => udl as usize,
        }
    }
}

impl fmt::Display for UserDataEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserDataEncoding::Gsm7 => f.write_str("GSM 7-bit"),
            UserDataEncoding::Ucs2 => f.write_str("UCS-2"),
        }
    }
}

/// Unpack `count` septets from a packed 7-bit bitstream
pub fn unpack_septets(bytes: &[u8], count: usize) -> Vec<u8> {
    (0..count)
        .map(|index| {
            let bit = index * 7;
            let byte = bit / 8;
            let shift = bit % 8;
            let low = bytes.get(byte).copied().unwrap_or(0) as u16;
            let high = bytes.get(byte + 1).copied().unwrap_or(0) as u16;
            (((high << 8 | low) >> shift) & 0x7F) as u8
        })
        .collect()
}

/// Pack septets into a 7-bit bitstream, low-order bits first
pub fn pack_septets(septets: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; (septets.len() * 7).div_ceil(8)];
    for (index, &septet) in septets.iter().enumerate() {
        let bit = index * 7;
        let byte = bit / 8;
        let shift = bit % 8;
        let value = ((septet & 0x7F) as u16) << shift;
        out[byte] |= value as u8;
        if shift > 1 {
            out[byte + 1] |= (value >> 8) as u8;
        }
    }
    out
}

/// Map septets through the default alphabet, resolving escape sequences
pub fn septets_to_text(septets: &[u8]) -> String {
    let mut text = String::with_capacity(septets.len());
    let mut iter = septets.iter().copied();
    while let Some(septet) = iter.next() {
        if septet != ESCAPE {
            text.push(GSM7_BASIC[(septet & 0x7F) as usize]);
            continue;
        }
        let Some(code) = iter.next() else {
            break;
        };
        match GSM7_EXTENSION.iter().find(|(ext, _)| *ext == code) {
            Some((_, c)) => text.push(*c),
            // Unknown escapes fall back to the default table
            None => text.push(GSM7_BASIC[(code & 0x7F) as usize]),
        }
    }
    text
}

/// Map text onto septets of the default alphabet
pub fn text_to_septets(text: &str) -> Result<Vec<u8>, PduError> {
    let mut septets = Vec::with_capacity(text.len());
    for c in text.chars() {
        if let Some(position) = GSM7_BASIC
            .iter()
            .position(|&basic| basic == c && basic != '\x1b')
        {
            septets.push(position as u8);
        } else if let Some((code, _)) = GSM7_EXTENSION.iter().find(|(_, ext)| *ext == c) {
            septets.push(ESCAPE);
            septets.push(*code);
        } else {
            return Err(PduError::UnencodableCharacter(c));
        }
    }
    Ok(septets)
}

pub(crate) fn ucs2_to_text(bytes: &[u8]) -> Result<String, PduError> {
    if bytes.len() % 2 != 0 {
        return Err(PduError::InvalidUcs2);
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| PduError::InvalidUcs2)
}

fn text_to_ucs2(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}
