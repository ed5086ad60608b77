// ABOUTME: SMS PDU dispatcher: status line, SMSC header and 3GPP TS 23.040 variant selection
// ABOUTME: Decodes the two-line `+CMGR`/`+CMGL` payload into one of six typed PDU variants

//! SMS PDU decoding
//!
//! A stored or received SMS is reported by the modem as two lines: a status
//! line in the AT message grammar and a hex PDU line.
//!
//! ```text
//! +CMGR: 0,,24
//! 07911326040000F0040B911346610089F6000020806291731480...
//! ```
//!
//! The PDU variant is chosen from the message type indicator (bits 1-0 of
//! the first octet) together with the transfer direction, since each MTI
//! value names one PDU per direction:
//!
//! | MTI  | SC → MS           | MS → SC             |
//! |------|-------------------|---------------------|
//! | `00` | SMS-DELIVER       | SMS-DELIVER-REPORT  |
//! | `01` | SMS-SUBMIT-REPORT | SMS-SUBMIT          |
//! | `10` | SMS-STATUS-REPORT | SMS-COMMAND         |
//! | `11` | reserved          | reserved            |

mod command;
mod deliver;
mod deliver_report;
mod status_report;
mod submit;
mod submit_report;

pub use command::Command;
pub use deliver::Deliver;
pub use deliver_report::DeliverReport;
pub use status_report::{DeliveryStatus, StatusReport};
pub use submit::{Submit, ValidityPeriod};
pub use submit_report::SubmitReport;

use crate::codec::{PduError, decode_hex, decode_u8};
use crate::datatypes::{
    AddressField, DataCodingScheme, Message, Parameter, ServiceCentreTimestamp, UserData,
    UserDataEncoding,
};
use std::io::Cursor;
use tracing::trace;

/// Which way a PDU travels between the mobile station and the service centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// SC → MS: received messages and reports from the network
    ToMobile,
    /// MS → SC: messages composed on (or stored by) the mobile
    ToServiceCentre,
}

/// Storage status `<stat>` of a message in modem memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmsStatus {
    ReceivedUnread = 0,
    ReceivedRead = 1,
    StoredUnsent = 2,
    StoredSent = 3,
}

impl SmsStatus {
    /// Accepts the PDU-mode integer or the text-mode name
    pub fn from_parameter(param: &Parameter) -> Option<Self> {
        match param {
            Parameter::Integer(0) => Some(SmsStatus::ReceivedUnread),
            Parameter::Integer(1) => Some(SmsStatus::ReceivedRead),
            Parameter::Integer(2) => Some(SmsStatus::StoredUnsent),
            Parameter::Integer(3) => Some(SmsStatus::StoredSent),
            Parameter::String(name) => match name.as_str() {
                "REC UNREAD" => Some(SmsStatus::ReceivedUnread),
                "REC READ" => Some(SmsStatus::ReceivedRead),
                "STO UNSENT" => Some(SmsStatus::StoredUnsent),
                "STO SENT" => Some(SmsStatus::StoredSent),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            SmsStatus::ReceivedUnread | SmsStatus::ReceivedRead => Direction::ToMobile,
            SmsStatus::StoredUnsent | SmsStatus::StoredSent => Direction::ToServiceCentre,
        }
    }
}

/// The status line preceding a PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Storage index, present on `+CMGL` listings
    pub index: Option<i64>,
    /// Storage status, absent on unsolicited `+CMT` / `+CDS` deliveries
    pub status: Option<SmsStatus>,
    /// TPDU length in octets, SMSC excluded
    pub length: Option<i64>,
}

impl StatusLine {
    pub fn parse(line: &str) -> Result<Self, PduError> {
        let message: Message = line.trim().parse()?;
        let params = message.parameters();
        let invalid = || PduError::InvalidStatusLine(line.to_owned());
        let status_at = |position: usize| {
            params
                .get(position)
                .and_then(SmsStatus::from_parameter)
                .ok_or_else(invalid)
        };

        let (index, status) = match message.command() {
            "+CMGL" => (
                Some(params.first().and_then(Parameter::as_int).ok_or_else(invalid)?),
                Some(status_at(1)?),
            ),
            "+CMT" | "+CDS" => (None, None),
            _ => (None, Some(status_at(0)?)),
        };

        Ok(StatusLine {
            index,
            status,
            length: params.last().and_then(Parameter::as_int),
        })
    }

    /// Direction implied by the status; unsolicited deliveries come from the network
    pub fn direction(&self) -> Direction {
        self.status
            .map_or(Direction::ToMobile, |status| status.direction())
    }
}

/// First octet of a TPDU
///
/// Bits 7-2 mean different things per PDU type; the accessors name the
/// interpretation and each variant documents which ones apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FirstOctet(pub u8);

impl FirstOctet {
    /// TP-MTI, bits 1-0
    pub fn message_type_indicator(&self) -> u8 {
        self.0 & 0b11
    }

    /// TP-MMS, bit 2; the bit is set when *no* more messages are waiting
    pub fn has_more_messages(&self) -> bool {
        self.0 & 0b0000_0100 == 0
    }

    /// TP-RD, bit 2 of an SMS-SUBMIT
    pub fn rejects_duplicates(&self) -> bool {
        self.0 & 0b0000_0100 != 0
    }

    /// TP-LP, bit 3
    pub fn loop_prevention(&self) -> bool {
        self.0 & 0b0000_1000 != 0
    }

    /// TP-VPF, bits 4-3 of an SMS-SUBMIT
    pub fn validity_period_format(&self) -> u8 {
        (self.0 >> 3) & 0b11
    }

    /// TP-SRI / TP-SRR / TP-SRQ, bit 5
    pub fn status_report_indication(&self) -> bool {
        self.0 & 0b0010_0000 != 0
    }

    /// TP-UDHI, bit 6
    pub fn has_user_data_header(&self) -> bool {
        self.0 & 0b0100_0000 != 0
    }

    /// TP-RP, bit 7
    pub fn has_reply_path(&self) -> bool {
        self.0 & 0b1000_0000 != 0
    }
}

/// Metadata shared by every PDU variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsHeader {
    pub status: Option<SmsStatus>,
    pub index: Option<i64>,
    pub smsc: Option<AddressField>,
    pub first_octet: FirstOctet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmsKind {
    Deliver,
    DeliverReport,
    Submit,
    SubmitReport,
    StatusReport,
    Command,
}

impl SmsKind {
    /// Select the PDU type from the MTI bits and the transfer direction
    pub fn select(mti: u8, direction: Direction) -> Result<Self, PduError> {
        use Direction::*;
        match (mti & 0b11, direction) {
            (0b00, ToMobile) => Ok(SmsKind::Deliver),
            (0b00, ToServiceCentre) => Ok(SmsKind::DeliverReport),
            (0b01, ToMobile) => Ok(SmsKind::SubmitReport),
            (0b01, ToServiceCentre) => Ok(SmsKind::Submit),
            (0b10, ToMobile) => Ok(SmsKind::StatusReport),
            (0b10, ToServiceCentre) => Ok(SmsKind::Command),
            (mti, _) => Err(PduError::ReservedMessageType(mti)),
        }
    }
}

/// A decoded SMS PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sms {
    Deliver(Deliver),
    DeliverReport(DeliverReport),
    Submit(Submit),
    SubmitReport(SubmitReport),
    StatusReport(StatusReport),
    Command(Command),
}

impl_sms_pdu!(Deliver, DeliverReport, Submit, SubmitReport, StatusReport, Command);

impl Sms {
    /// Decode a status line and PDU line, taking the direction from the status
    ///
    /// `fallback` is used when the data coding scheme names no supported
    /// alphabet.
    pub fn decode(
        status_line: &str,
        pdu_line: &str,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let status = StatusLine::parse(status_line)?;
        let direction = status.direction();
        Self::decode_pdu(status, pdu_line, direction, fallback)
    }

    /// Decode with an explicit direction, overriding the one the status implies
    pub fn decode_with_direction(
        status_line: &str,
        pdu_line: &str,
        direction: Direction,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let status = StatusLine::parse(status_line)?;
        Self::decode_pdu(status, pdu_line, direction, fallback)
    }

    /// Decode the newline-joined two-line payload
    pub fn from_payload(payload: &str, fallback: Option<UserDataEncoding>) -> Result<Self, PduError> {
        let mut lines = payload
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());
        let status_line = lines
            .next()
            .ok_or_else(|| PduError::InvalidStatusLine(payload.to_owned()))?;
        let pdu_line = lines.next().ok_or(PduError::TruncatedPdu { field: "PDU line" })?;
        Self::decode(status_line, pdu_line, fallback)
    }

    fn decode_pdu(
        status: StatusLine,
        pdu_line: &str,
        direction: Direction,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let bytes = decode_hex(pdu_line)?;
        let mut buf = Cursor::new(bytes.as_slice());

        let smsc = AddressField::read_smsc(&mut buf)?;
        let first_octet = FirstOctet(decode_u8(&mut buf, "first octet")?);
        let kind = SmsKind::select(first_octet.message_type_indicator(), direction)?;
        trace!(?kind, ?direction, first_octet = first_octet.0, "decoding PDU");

        let header = SmsHeader {
            status: status.status,
            index: status.index,
            smsc,
            first_octet,
        };

        let sms = match kind {
            SmsKind::Deliver => Sms::Deliver(Deliver::read(header, &mut buf, fallback)?),
            SmsKind::DeliverReport => {
                Sms::DeliverReport(DeliverReport::read(header, &mut buf, fallback)?)
            }
            SmsKind::Submit => Sms::Submit(Submit::read(header, &mut buf, fallback)?),
            SmsKind::SubmitReport => {
                Sms::SubmitReport(SubmitReport::read(header, &mut buf, fallback)?)
            }
            SmsKind::StatusReport => {
                Sms::StatusReport(StatusReport::read(header, &mut buf, fallback)?)
            }
            SmsKind::Command => Sms::Command(Command::read(header, &mut buf)?),
        };
        Ok(sms)
    }

    pub fn status(&self) -> Option<SmsStatus> {
        self.header().status
    }

    pub fn smsc(&self) -> Option<&AddressField> {
        self.header().smsc.as_ref()
    }

    /// True when the service centre has more messages waiting (SC → MS PDUs only)
    pub fn has_more_messages(&self) -> bool {
        matches!(self, Sms::Deliver(_) | Sms::StatusReport(_))
            && self.header().first_octet.has_more_messages()
    }

    pub fn has_reply_path(&self) -> bool {
        matches!(self, Sms::Deliver(_) | Sms::Submit(_))
            && self.header().first_octet.has_reply_path()
    }

    pub fn has_user_data_header(&self) -> bool {
        self.header().first_octet.has_user_data_header()
    }

    pub fn status_report_indication(&self) -> bool {
        self.header().first_octet.status_report_indication()
    }

    /// The originating address of an SMS-DELIVER
    pub fn originating_address(&self) -> Option<&AddressField> {
        match self {
            Sms::Deliver(pdu) => Some(&pdu.originating_address),
            _ => None,
        }
    }

    /// The remote party: originator, destination or recipient depending on the variant
    pub fn address(&self) -> Option<&AddressField> {
        match self {
            Sms::Deliver(pdu) => Some(&pdu.originating_address),
            Sms::Submit(pdu) => Some(&pdu.destination_address),
            Sms::StatusReport(pdu) => Some(&pdu.recipient_address),
            Sms::Command(pdu) => Some(&pdu.destination_address),
            Sms::DeliverReport(_) | Sms::SubmitReport(_) => None,
        }
    }

    pub fn protocol_id(&self) -> Option<u8> {
        match self {
            Sms::Deliver(pdu) => Some(pdu.protocol_id),
            Sms::Submit(pdu) => Some(pdu.protocol_id),
            Sms::Command(pdu) => Some(pdu.protocol_id),
            Sms::DeliverReport(pdu) => pdu.protocol_id,
            Sms::SubmitReport(pdu) => pdu.protocol_id,
            Sms::StatusReport(pdu) => pdu.protocol_id,
        }
    }

    pub fn timestamp(&self) -> Option<&ServiceCentreTimestamp> {
        match self {
            Sms::Deliver(pdu) => Some(&pdu.timestamp),
            Sms::SubmitReport(pdu) => Some(&pdu.timestamp),
            Sms::StatusReport(pdu) => Some(&pdu.timestamp),
            Sms::DeliverReport(_) | Sms::Submit(_) | Sms::Command(_) => None,
        }
    }

    pub fn user_data(&self) -> Option<&UserData> {
        match self {
            Sms::Deliver(pdu) => Some(&pdu.user_data),
            Sms::Submit(pdu) => Some(&pdu.user_data),
            Sms::DeliverReport(pdu) => pdu.user_data.as_ref(),
            Sms::SubmitReport(pdu) => pdu.user_data.as_ref(),
            Sms::StatusReport(pdu) => pdu.user_data.as_ref(),
            Sms::Command(_) => None,
        }
    }

    /// Decoded text of the user data, if any
    pub fn text(&self) -> Option<&str> {
        self.user_data().map(UserData::text)
    }
}

/// Resolve the user-data encoding from a DCS, falling back when it names none
pub(crate) fn resolve_encoding(
    dcs: DataCodingScheme,
    fallback: Option<UserDataEncoding>,
) -> Result<UserDataEncoding, PduError> {
    dcs.encoding()
        .or(fallback)
        .ok_or(PduError::UnresolvableEncoding(dcs.to_byte()))
}

/// Optional trailing fields of the report PDUs, announced by TP-PI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OptionalTail {
    pub protocol_id: Option<u8>,
    pub data_coding: Option<DataCodingScheme>,
    pub user_data: Option<UserData>,
}

impl OptionalTail {
    const HAS_PROTOCOL_ID: u8 = 0b001;
    const HAS_DATA_CODING: u8 = 0b010;
    const HAS_USER_DATA: u8 = 0b100;

    pub(crate) fn read(
        buf: &mut Cursor<&[u8]>,
        parameter_indicator: u8,
        has_header: bool,
        fallback: Option<UserDataEncoding>,
    ) -> Result<Self, PduError> {
        let protocol_id = if parameter_indicator & Self::HAS_PROTOCOL_ID != 0 {
            Some(decode_u8(buf, "protocol identifier")?)
        } else {
            None
        };
        let data_coding = if parameter_indicator & Self::HAS_DATA_CODING != 0 {
            Some(DataCodingScheme::from_byte(decode_u8(buf, "data coding scheme")?))
        } else {
            None
        };
        let user_data = if parameter_indicator & Self::HAS_USER_DATA != 0 {
            // A missing DCS means the default alphabet
            let encoding = resolve_encoding(data_coding.unwrap_or_default(), fallback)?;
            Some(UserData::read(buf, encoding, has_header)?)
        } else {
            None
        };

        Ok(OptionalTail {
            protocol_id,
            data_coding,
            user_data,
        })
    }
}

/// Reads TP-FCS when present, then TP-PI
///
/// Failure causes are all `0x80` or above while TP-PI values in use keep
/// bit 7 clear, so a high octet here is taken as the failure cause.
pub(crate) fn read_failure_and_indicator(
    buf: &mut Cursor<&[u8]>,
) -> Result<(Option<u8>, u8), PduError> {
    let octet = decode_u8(buf, "parameter indicator")?;
    if octet & 0x80 == 0 {
        return Ok((None, octet));
    }
    let indicator = decode_u8(buf, "parameter indicator")?;
    Ok((Some(octet), indicator))
}
