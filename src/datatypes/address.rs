// ABOUTME: Address field codec for SMSC, originating and destination addresses in SMS PDUs
// ABOUTME: Decodes semi-octet swapped digits and 7-bit packed alphanumeric senders with TON/NPI

use crate::codec::{Decodable, PduError, decode_bytes, decode_u8};
use crate::datatypes::encoding::{septets_to_text, unpack_septets};
use crate::datatypes::{NumberingPlan, TypeOfNumber};
use std::fmt;
use std::io::Cursor;

/// A decoded address field
///
/// Numeric numbers are stored as upper-case digits with the `F` filler
/// removed. Alphanumeric numbers are decoded through the GSM 7-bit alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressField {
    type_byte: u8,
    type_of_number: TypeOfNumber,
    numbering_plan: NumberingPlan,
    number: String,
}

impl AddressField {
    /// Type octet of an international ISDN/E.164 number
    pub const INTERNATIONAL_ISDN: u8 = 0x91;

    /// Decode an address from its type octet and the raw digit octets
    ///
    /// `semi_octets` is the count of useful semi-octets when known; it bounds
    /// how many septets an alphanumeric address yields. When `None`, every
    /// whole septet carried by `digits` is decoded.
    pub fn decode(type_byte: u8, digits: &[u8], semi_octets: Option<usize>) -> Self {
        let type_of_number = TypeOfNumber::from_type_byte(type_byte);
        let number = if type_of_number == TypeOfNumber::Alphanumeric {
            let semi_octets = semi_octets.unwrap_or(digits.len() * 2);
            let septets = unpack_septets(digits, semi_octets * 4 / 7);
            septets_to_text(&septets)
        } else {
            let mut number: String = digits
                .iter()
                .flat_map(|byte| [byte & 0x0F, byte >> 4])
                .map(|nibble| {
                    char::from_digit(nibble as u32, 16)
                        .unwrap_or('F')
                        .to_ascii_uppercase()
                })
                .collect();
            if number.ends_with('F') {
                number.pop();
            }
            number
        };

        AddressField {
            type_byte,
            type_of_number,
            numbering_plan: NumberingPlan::from_type_byte(type_byte),
            number,
        }
    }

    /// Read a service centre address, whose length octet counts octets
    /// including the type octet
    ///
    /// A zero length means the modem omitted the SMSC and yields `None`.
    pub fn read_smsc(buf: &mut Cursor<&[u8]>) -> Result<Option<Self>, PduError> {
        let len = decode_u8(buf, "SMSC length")? as usize;
        if len == 0 {
            return Ok(None);
        }
        let type_byte = decode_u8(buf, "SMSC type")?;
        let digits = decode_bytes(buf, len - 1, "SMSC number")?;
        Ok(Some(Self::decode(type_byte, &digits, None)))
    }

    /// Read an originating, destination or recipient address, whose length
    /// octet counts useful semi-octets
    pub fn read_address(buf: &mut Cursor<&[u8]>) -> Result<Self, PduError> {
        let semi_octets = decode_u8(buf, "address length")? as usize;
        let type_byte = decode_u8(buf, "address type")?;
        let digits = decode_bytes(buf, semi_octets.div_ceil(2), "address number")?;
        Ok(Self::decode(type_byte, &digits, Some(semi_octets)))
    }

    pub fn type_byte(&self) -> u8 {
        self.type_byte
    }

    pub fn type_of_number(&self) -> TypeOfNumber {
        self.type_of_number
    }

    pub fn numbering_plan(&self) -> NumberingPlan {
        self.numbering_plan
    }

    /// True only for the `0x91` type octet
    pub fn is_international(&self) -> bool {
        self.type_byte == Self::INTERNATIONAL_ISDN
    }

    pub fn is_alphanumeric(&self) -> bool {
        self.type_of_number == TypeOfNumber::Alphanumeric
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

impl Decodable for AddressField {
    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, PduError> {
        Self::read_address(buf)
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_international() {
            write!(f, "+{}", self.number)
        } else {
            f.write_str(&self.number)
        }
    }
}
