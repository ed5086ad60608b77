use super::{SmsHeader, resolve_encoding};
use crate::codec::{Decodable, PduError, decode_u8};
use crate::datatypes::{
    AddressField, DataCodingScheme, ServiceCentreTimestamp, UserData, UserDataEncoding,
};
use std::io::Cursor;

/// SMS-DELIVER: a short message from the service centre to the mobile
///
/// Layout after the first octet: TP-OA, TP-PID, TP-DCS, TP-SCTS, TP-UDL, TP-UD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deliver {
    pub header: SmsHeader,
    pub originating_address: AddressField,
    pub protocol_id: u8,
    pub data_coding: DataCodingScheme,
    pub timestamp: ServiceCentreTimestamp,
    pub user_data: UserData,
}

impl Deliver {
    pub(crate) fn read(
        header: SmsHeader,
        buf: &mut Cursor<&[u8]>,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let originating_address = AddressField::read_address(buf)?;
        let protocol_id = decode_u8(buf, "protocol identifier")?;
        let data_coding = DataCodingScheme::from_byte(decode_u8(buf, "data coding scheme")?);
        let timestamp = ServiceCentreTimestamp::decode(buf)?;
        let encoding = resolve_encoding(data_coding, fallback)?;
        let user_data =
            UserData::read(buf, encoding, header.first_octet.has_user_data_header())?;

        Ok(Deliver {
            header,
            originating_address,
            protocol_id,
            data_coding,
            timestamp,
            user_data,
        })
    }
}
