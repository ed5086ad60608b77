// ABOUTME: Length-prefixed SMS user data with optional user data header (UDH)
// ABOUTME: Decodes the payload through the resolved GSM 7-bit or UCS-2 strategy

use crate::codec::{Decodable, PduError, decode_bytes, decode_u8, encode_hex};
use crate::datatypes::encoding::{UserDataEncoding, septets_to_text, ucs2_to_text, unpack_septets};
use std::io::Cursor;

/// Decoded user data of a single PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    encoding: UserDataEncoding,
    raw: String,
    header: Option<UserDataHeader>,
    text: String,
}

impl UserData {
    /// Decode a bare hex payload with no header and no length prefix
    pub fn from_hex(encoding: UserDataEncoding, raw: &str) -> Result<Self, PduError> {
        let text = encoding.decode(raw)?;
        Ok(UserData {
            encoding,
            raw: raw.trim().to_ascii_uppercase(),
            header: None,
            text,
        })
    }

    /// Read `UDL` followed by the user data it describes
    ///
    /// For GSM 7-bit the length counts septets, for UCS-2 it counts octets.
    /// When `has_header` is set the leading header is split off and the text
    /// starts after it (on the next septet boundary for GSM 7-bit).
    pub fn read(
        buf: &mut Cursor<&[u8]>,
        encoding: UserDataEncoding,
        has_header: bool,
    ) -> Result<Self, PduError> {
        let udl = decode_u8(buf, "user data length")?;
        let bytes = decode_bytes(buf, encoding.octet_len(udl), "user data")?;

        let header = if has_header {
            Some(UserDataHeader::from_bytes(&bytes)?)
        } else {
            None
        };
        let header_len = header.as_ref().map_or(0, UserDataHeader::encoded_len);

        let text = match encoding {
            UserDataEncoding::Gsm7 => {
                let septets = unpack_septets(&bytes, udl as usize);
                let skip = (header_len * 8).div_ceil(7).min(septets.len());
                septets_to_text(&septets[skip..])
            }
            UserDataEncoding::Ucs2 => ucs2_to_text(&bytes[header_len.min(bytes.len())..])?,
        };

        Ok(UserData {
            encoding,
            raw: encode_hex(&bytes),
            header,
            text,
        })
    }

    pub fn encoding(&self) -> UserDataEncoding {
        self.encoding
    }

    /// The user data as upper-case hex, header included
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> Option<&UserDataHeader> {
        self.header.as_ref()
    }

    /// Decoded text, header excluded
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A single information element of a user data header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

/// Concatenated short message reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Concatenation {
    pub reference: u16,
    pub total: u8,
    pub sequence: u8,
}

/// Parsed user data header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserDataHeader {
    elements: Vec<InformationElement>,
}

impl UserDataHeader {
    const CONCAT_8BIT: u8 = 0x00;
    const CONCAT_16BIT: u8 = 0x08;

    /// Parse a header from the start of the user data octets (`UDHL` first)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PduError> {
        let mut buf = Cursor::new(bytes);
        Self::decode(&mut buf)
    }

    pub fn elements(&self) -> &[InformationElement] {
        &self.elements
    }

    pub fn element(&self, id: u8) -> Option<&InformationElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Octets the header occupies, the `UDHL` octet included
    pub fn encoded_len(&self) -> usize {
        1 + self
            .elements
            .iter()
            .map(|element| 2 + element.data.len())
            .sum::<usize>()
    }

    /// Concatenation info from IEI 0x00 (8-bit reference) or 0x08 (16-bit)
    pub fn concatenation(&self) -> Option<Concatenation> {
        self.elements.iter().find_map(|element| {
            match (element.id, element.data.as_slice()) {
                (Self::CONCAT_8BIT, &[reference, total, sequence]) => Some(Concatenation {
                    reference: reference as u16,
                    total,
                    sequence,
                }),
                (Self::CONCAT_16BIT, &[high, low, total, sequence]) => Some(Concatenation {
                    reference: u16::from_be_bytes([high, low]),
                    total,
                    sequence,
                }),
                _ => None,
            }
        })
    }
}

impl Decodable for UserDataHeader {
    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, PduError> {
        let udhl = decode_u8(buf, "user data header length")? as usize;
        let body = decode_bytes(buf, udhl, "user data header")?;

        let mut body = Cursor::new(body.as_slice());
        let mut elements = Vec::new();
        while (body.position() as usize) < udhl {
            let id = decode_u8(&mut body, "information element id")?;
            let len = decode_u8(&mut body, "information element length")? as usize;
            let data = decode_bytes(&mut body, len, "information element data")?;
            elements.push(InformationElement { id, data });
        }
        Ok(UserDataHeader { elements })
    }
}
