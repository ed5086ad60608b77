use super::SmsHeader;
use crate::codec::{PduError, decode_bytes, decode_u8};
use crate::datatypes::AddressField;
use std::io::Cursor;

/// SMS-COMMAND: an operation on a previously submitted message
///
/// Layout after the first octet: TP-MR, TP-PID, TP-CT, TP-MN, TP-DA, TP-CDL,
/// TP-CD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub header: SmsHeader,
    pub message_reference: u8,
    pub protocol_id: u8,
    pub command_type: u8,
    pub message_number: u8,
    pub destination_address: AddressField,
    pub command_data: Vec<u8>,
}

impl Command {
    pub(crate) fn read(header: SmsHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, PduError> {
        let message_reference = decode_u8(buf, "message reference")?;
        let protocol_id = decode_u8(buf, "protocol identifier")?;
        let command_type = decode_u8(buf, "command type")?;
        let message_number = decode_u8(buf, "message number")?;
        let destination_address = AddressField::read_address(buf)?;
        let len = decode_u8(buf, "command data length")? as usize;
        let command_data = decode_bytes(buf, len, "command data")?;

        Ok(Command {
            header,
            message_reference,
            protocol_id,
            command_type,
            message_number,
            destination_address,
            command_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::sms::{Sms, SmsKind, SmsStatus};

    #[test]
    fn test_command() {
        let sms = Sms::decode("+CMGR: 3,,14", "00020500012A0B916407281553F800", None).unwrap();
        assert_eq!(sms.kind(), SmsKind::Command);
        assert_eq!(sms.status(), Some(SmsStatus::StoredSent));
        let Sms::Command(command) = &sms else {
            panic!("expected SMS-COMMAND");
        };
        assert_eq!(command.message_reference, 5);
        assert_eq!(command.command_type, 1);
        assert_eq!(command.message_number, 0x2A);
        assert_eq!(sms.address().unwrap().number(), "46708251358");
        assert!(command.command_data.is_empty());
        assert_eq!(sms.text(), None);
    }
}
