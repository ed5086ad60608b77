// ABOUTME: Strongly-typed SMS data coding scheme (TP-DCS) with encoding and message class lookup
// ABOUTME: Wraps the raw DCS octet and resolves the user-data encoding strategy from it

use crate::datatypes::encoding::UserDataEncoding;
use num_enum::TryFromPrimitive;
use std::fmt;

/// Data coding scheme octet as carried in SMS-DELIVER / SMS-SUBMIT PDUs
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataCodingScheme(u8);

impl DataCodingScheme {
    pub fn from_byte(value: u8) -> Self {
        DataCodingScheme(value)
    }

    /// Returns the raw u8 value for the wire
    pub fn to_byte(&self) -> u8 {
        self.0
    }

    /// The user-data encoding selected by bits 3-2, if one is resolvable
    pub fn encoding(&self) -> Option<UserDataEncoding> {
        UserDataEncoding::from_dcs(self.0)
    }

    /// Returns the message class if this coding scheme includes one
    pub fn message_class(&self) -> Option<MessageClass> {
        let has_class = match self.0 >> 6 {
            // General data coding group: bit 4 flags the class as meaningful
            0b00 => self.0 & 0x10 != 0,
            0b11 => self.0 & 0xF0 == 0xF0,
            _ => false,
        };
        if !has_class {
            return None;
        }
        MessageClass::try_from(self.0 & 0b11).ok()
    }

    /// Returns true if the general data coding group marks the text as compressed
    pub fn is_compressed(&self) -> bool {
        self.0 >> 6 == 0b00 && self.0 & 0x20 != 0
    }

    /// Returns the character set name for this encoding
    pub fn charset_name(&self) -> &'static str {
        match self.encoding() {
            Some(UserDataEncoding::Gsm7) => "GSM 7-bit Default",
            Some(UserDataEncoding::Ucs2) => "UCS-2",
            None if self.0 & 0b1100 == 0b0100 => "8-bit data",
            None => "Reserved",
        }
    }
}

impl From<u8> for DataCodingScheme {
    fn from(value: u8) -> Self {
        DataCodingScheme(value)
    }
}

impl fmt::Debug for DataCodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataCodingScheme({:#04x}, {})", self.0, self.charset_name())
    }
}

/// SMS message class
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageClass {
    /// Class 0: Flash message, displayed immediately
    Flash = 0,
    /// Class 1: Mobile Equipment specific
    MobileEquipment = 1,
    /// Class 2: SIM specific
    SimSpecific = 2,
    /// Class 3: Terminal Equipment specific
    TerminalEquipment = 3,
}

impl MessageClass {
    pub fn description(&self) -> &'static str {
        match self {
            MessageClass::Flash => "Flash SMS (immediate display)",
            MessageClass::MobileEquipment => "Mobile Equipment specific",
            MessageClass::SimSpecific => "SIM card storage",
            MessageClass::TerminalEquipment => "Terminal Equipment specific",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dcs_encoding_resolution() {
        assert_eq!(
            DataCodingScheme::from_byte(0x00).encoding(),
            Some(UserDataEncoding::Gsm7)
        );
        assert_eq!(
            DataCodingScheme::from_byte(0x08).encoding(),
            Some(UserDataEncoding::Ucs2)
        );
        assert_eq!(DataCodingScheme::from_byte(0x04).encoding(), None);
        assert_eq!(DataCodingScheme::from_byte(0x04).charset_name(), "8-bit data");
    }

    #[test]
    fn test_dcs_message_class() {
        assert_eq!(DataCodingScheme::from_byte(0x00).message_class(), None);
        assert_eq!(
            DataCodingScheme::from_byte(0x10).message_class(),
            Some(MessageClass::Flash)
        );
        assert_eq!(
            DataCodingScheme::from_byte(0x1A).message_class(),
            Some(MessageClass::SimSpecific)
        );
        assert_eq!(
            DataCodingScheme::from_byte(0xF1).message_class(),
            Some(MessageClass::MobileEquipment)
        );
        // Message waiting groups carry no class
        assert_eq!(DataCodingScheme::from_byte(0xC3).message_class(), None);
    }

    #[test]
    fn test_dcs_compressed_flag() {
        assert!(DataCodingScheme::from_byte(0x20).is_compressed());
        assert!(!DataCodingScheme::from_byte(0x08).is_compressed());
    }

    #[test]
    fn test_message_class_descriptions() {
        assert_eq!(MessageClass::SimSpecific.description(), "SIM card storage");
    }
}
