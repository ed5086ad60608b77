use super::{SmsHeader, resolve_encoding};
use crate::codec::{Decodable, PduError, decode_bytes, decode_u8};
use crate::datatypes::{
    AddressField, DataCodingScheme, ServiceCentreTimestamp, UserData, UserDataEncoding,
};
use std::io::Cursor;
use std::time::Duration;

/// TP-VP in the format selected by TP-VPF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityPeriod {
    Relative(u8),
    Enhanced([u8; 7]),
    Absolute(ServiceCentreTimestamp),
}

impl ValidityPeriod {
    const ENHANCED: u8 = 0b01;
    const RELATIVE: u8 = 0b10;
    const ABSOLUTE: u8 = 0b11;

    fn read(buf: &mut Cursor<&[u8]>, format: u8) -> Result<Option<Self>, PduError> {
        let period = match format {
            Self::RELATIVE => ValidityPeriod::Relative(decode_u8(buf, "validity period")?),
            Self::ENHANCED => {
                let bytes = decode_bytes(buf, 7, "validity period")?;
                let mut octets = [0u8; 7];
                octets.copy_from_slice(&bytes);
                ValidityPeriod::Enhanced(octets)
            }
            Self::ABSOLUTE => ValidityPeriod::Absolute(ServiceCentreTimestamp::decode(buf)?),
            _ => return Ok(None),
        };
        Ok(Some(period))
    }

    /// Length of a relative validity period
    pub fn relative_duration(&self) -> Option<Duration> {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        const DAY: u64 = 24 * HOUR;

        let ValidityPeriod::Relative(value) = *self else {
            return None;
        };
        let value = value as u64;
        let seconds = match value {
            0..=143 => (value + 1) * 5 * MINUTE,
            144..=167 => 12 * HOUR + (value - 143) * 30 * MINUTE,
            168..=196 => (value - 166) * DAY,
            _ => (value - 192) * 7 * DAY,
        };
        Some(Duration::from_secs(seconds))
    }
}

/// SMS-SUBMIT: a short message from the mobile to the service centre
///
/// Layout after the first octet: TP-MR, TP-DA, TP-PID, TP-DCS, [TP-VP],
/// TP-UDL, TP-UD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submit {
    pub header: SmsHeader,
    pub message_reference: u8,
    pub destination_address: AddressField,
    pub protocol_id: u8,
    pub data_coding: DataCodingScheme,
    pub validity_period: Option<ValidityPeriod>,
    pub user_data: UserData,
}

impl Submit {
    pub(crate) fn read(
        header: SmsHeader,
        buf: &mut Cursor<&[u8]>,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let message_reference = decode_u8(buf, "message reference")?;
        let destination_address = AddressField::read_address(buf)?;
        let protocol_id = decode_u8(buf, "protocol identifier")?;
        let data_coding = DataCodingScheme::from_byte(decode_u8(buf, "data coding scheme")?);
        let validity_period =
            ValidityPeriod::read(buf, header.first_octet.validity_period_format())?;
        let encoding = resolve_encoding(data_coding, fallback)?;
        let user_data =
            UserData::read(buf, encoding, header.first_octet.has_user_data_header())?;

        Ok(Submit {
            header,
            message_reference,
            destination_address,
            protocol_id,
            data_coding,
            validity_period,
            user_data,
        })
    }

    /// TP-RD: the service centre should reject a duplicate of this message
    pub fn rejects_duplicates(&self) -> bool {
        self.header.first_octet.rejects_duplicates()
    }
}
