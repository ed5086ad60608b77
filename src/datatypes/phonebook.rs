// ABOUTME: Phonebook entries decoded from `+CPBR` responses
// ABOUTME: Thin consumer of the Message codec mapping positional parameters to fields

use crate::codec::ParseError;
use crate::datatypes::{Message, Parameter};

/// Numbering scheme of a stored number, from the `<type>` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberingScheme {
    National,
    International,
}

impl NumberingScheme {
    const NATIONAL_TYPE: i64 = 129;

    pub fn from_type(value: i64) -> Self {
        if value == Self::NATIONAL_TYPE {
            NumberingScheme::National
        } else {
            NumberingScheme::International
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneBookEntry {
    pub index: i64,
    pub number: String,
    pub scheme: NumberingScheme,
    pub contact_name: String,
}

impl PhoneBookEntry {
    /// Build an entry from a line such as `+CPBR: 1,"5551234",129,"Bob"`
    pub fn from_payload(payload: &str) -> Result<Self, ParseError> {
        let message: Message = payload.parse()?;
        Self::from_parameters(message.parameters())
    }

    pub fn from_parameters(params: &[Parameter]) -> Result<Self, ParseError> {
        let index = params
            .first()
            .and_then(Parameter::as_int)
            .ok_or_else(|| ParseError::malformed("phonebook entry has no index"))?;
        let number = match params.get(1) {
            Some(Parameter::String(number)) => number.clone(),
            Some(Parameter::Integer(number)) => number.to_string(),
            _ => return Err(ParseError::malformed("phonebook entry has no number")),
        };
        let scheme = params
            .get(2)
            .and_then(Parameter::as_int)
            .map(NumberingScheme::from_type)
            .ok_or_else(|| ParseError::malformed("phonebook entry has no number type"))?;
        let contact_name = params
            .get(3)
            .and_then(Parameter::as_str)
            .unwrap_or_default()
            .to_owned();

        Ok(PhoneBookEntry {
            index,
            number,
            scheme,
            contact_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_entry() {
        let entry = PhoneBookEntry::from_payload("+CPBR: 1,\"5551234\",129,\"Bob\"").unwrap();
        assert_eq!(entry.index, 1);
        assert_eq!(entry.number, "5551234");
        assert_eq!(entry.scheme, NumberingScheme::National);
        assert_eq!(entry.contact_name, "Bob");
    }

    #[test]
    fn test_international_entry() {
        let entry =
            PhoneBookEntry::from_payload("+CPBR: 12,\"+447700900123\",145,\"Alice, work\"")
                .unwrap();
        assert_eq!(entry.index, 12);
        assert_eq!(entry.scheme, NumberingScheme::International);
        assert_eq!(entry.contact_name, "Alice, work");
    }

    #[test]
    fn test_missing_fields_fail() {
        assert!(matches!(
            PhoneBookEntry::from_payload("+CPBR: 1"),
            Err(ParseError::MalformedParameterList { .. })
        ));
    }
}
