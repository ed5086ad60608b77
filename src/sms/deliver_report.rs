use super::{OptionalTail, SmsHeader, read_failure_and_indicator};
use crate::codec::PduError;
use crate::datatypes::{DataCodingScheme, UserData, UserDataEncoding};
use std::io::Cursor;

/// SMS-DELIVER-REPORT: the mobile's acknowledgement of an SMS-DELIVER
///
/// Layout after the first octet: [TP-FCS], TP-PI, [TP-PID], [TP-DCS],
/// [TP-UDL, TP-UD]. TP-FCS is only present when reporting an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverReport {
    pub header: SmsHeader,
    pub failure_cause: Option<u8>,
    pub parameter_indicator: u8,
    pub protocol_id: Option<u8>,
    pub data_coding: Option<DataCodingScheme>,
    pub user_data: Option<UserData>,
}

impl DeliverReport {
    pub(crate) fn read(
        header: SmsHeader,
        buf: &mut Cursor<&[u8]>,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let (failure_cause, parameter_indicator) = read_failure_and_indicator(buf)?;
        let tail = OptionalTail::read(
            buf,
            parameter_indicator,
            header.first_octet.has_user_data_header(),
            fallback,
        )?;

        Ok(DeliverReport {
            header,
            failure_cause,
            parameter_indicator,
            protocol_id: tail.protocol_id,
            data_coding: tail.data_coding,
            user_data: tail.user_data,
        })
    }

    /// True when the report carries a failure cause (RP-ERROR)
    pub fn is_error(&self) -> bool {
        self.failure_cause.is_some()
    }
}
