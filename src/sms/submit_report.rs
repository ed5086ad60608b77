use super::{OptionalTail, SmsHeader, read_failure_and_indicator};
use crate::codec::{Decodable, PduError};
use crate::datatypes::{DataCodingScheme, ServiceCentreTimestamp, UserData, UserDataEncoding};
use std::io::Cursor;

/// SMS-SUBMIT-REPORT: the service centre's answer to an SMS-SUBMIT
///
/// Layout after the first octet: [TP-FCS], TP-PI, TP-SCTS, [TP-PID],
/// [TP-DCS], [TP-UDL, TP-UD].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub header: SmsHeader,
    pub failure_cause: Option<u8>,
    pub parameter_indicator: u8,
    pub timestamp: ServiceCentreTimestamp,
    pub protocol_id: Option<u8>,
    pub data_coding: Option<DataCodingScheme>,
    pub user_data: Option<UserData>,
}

impl SubmitReport {
    pub(crate) fn read(
        header: SmsHeader,
        buf: &mut Cursor<&[u8]>,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let (failure_cause, parameter_indicator) = read_failure_and_indicator(buf)?;
        let timestamp = ServiceCentreTimestamp::decode(buf)?;
        let tail = OptionalTail::read(
            buf,
            parameter_indicator,
            header.first_octet.has_user_data_header(),
            fallback,
        )?;

        Ok(SubmitReport {
            header,
            failure_cause,
            parameter_indicator,
            timestamp,
            protocol_id: tail.protocol_id,
            data_coding: tail.data_coding,
            user_data: tail.user_data,
        })
    }

    pub fn is_error(&self) -> bool {
        self.failure_cause.is_some()
    }
}
