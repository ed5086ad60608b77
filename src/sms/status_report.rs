use super::{OptionalTail, SmsHeader};
use crate::codec::{Decodable, PduError, decode_u8};
use crate::datatypes::{
    AddressField, DataCodingScheme, ServiceCentreTimestamp, UserData, UserDataEncoding,
};
use bytes::Buf;
use std::io::Cursor;

/// TP-ST delivery status of a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliveryStatus(pub u8);

impl DeliveryStatus {
    /// Transaction completed (`0x00`-`0x1F`)
    pub fn is_success(&self) -> bool {
        self.0 < 0x20
    }

    /// The service centre is still trying (`0x20`-`0x3F`)
    pub fn is_temporary_error(&self) -> bool {
        (0x20..=0x3F).contains(&self.0)
    }

    /// The service centre has given up (`0x40`-`0x7F`)
    pub fn is_permanent_error(&self) -> bool {
        (0x40..=0x7F).contains(&self.0)
    }
}

/// SMS-STATUS-REPORT: delivery outcome of an earlier SMS-SUBMIT
///
/// Layout after the first octet: TP-MR, TP-RA, TP-SCTS, TP-DT, TP-ST,
/// then optionally TP-PI, [TP-PID], [TP-DCS], [TP-UDL, TP-UD].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub header: SmsHeader,
    pub message_reference: u8,
    pub recipient_address: AddressField,
    pub timestamp: ServiceCentreTimestamp,
    pub discharge_time: ServiceCentreTimestamp,
    pub delivery_status: DeliveryStatus,
    pub parameter_indicator: Option<u8>,
    pub protocol_id: Option<u8>,
    pub data_coding: Option<DataCodingScheme>,
    pub user_data: Option<UserData>,
}

impl StatusReport {
    pub(crate) fn read(
        header: SmsHeader,
        buf: &mut Cursor<&[u8]>,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let message_reference = decode_u8(buf, "message reference")?;
        let recipient_address = AddressField::read_address(buf)?;
        let timestamp = ServiceCentreTimestamp::decode(buf)?;
        let discharge_time = ServiceCentreTimestamp::decode(buf)?;
        let delivery_status = DeliveryStatus(decode_u8(buf, "status")?);

        let parameter_indicator = if buf.has_remaining() {
            Some(decode_u8(buf, "parameter indicator")?)
        } else {
            None
        };
        let tail = match parameter_indicator {
            Some(indicator) => OptionalTail::read(
                buf,
                indicator,
                header.first_octet.has_user_data_header(),
                fallback,
            )?,
            None => OptionalTail::default(),
        };

        Ok(StatusReport {
            header,
            message_reference,
            recipient_address,
            timestamp,
            discharge_time,
            delivery_status,
            parameter_indicator,
            protocol_id: tail.protocol_id,
            data_coding: tail.data_coding,
            user_data: tail.user_data,
        })
    }
}
