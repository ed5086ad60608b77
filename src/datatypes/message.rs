// ABOUTME: AT command/response message model with wire-text parsing and serialization
// ABOUTME: Recognises basic result codes, outbound `AT` commands and tagged `+NAME: ...` responses

use crate::codec::ParseError;
use crate::datatypes::parameter::{Parameter, parse_parameters, stringify_parameters};
use std::fmt;
use std::str::FromStr;

/// The syntactic kind of an AT message, which fixes its separator on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `AT+CMD`
    Execute,
    /// `OK`, `ERROR`, ... (no separator, no parameters)
    BasicResponse,
    /// `+CMD: params`
    Response,
    /// `AT+CMD=params`
    Set,
    /// `AT+CMD?`
    Read,
    /// `AT+CMD=?`
    Test,
}

impl MessageKind {
    /// The separator written between the command name and its parameters
    pub fn separator(&self) -> &'static str {
        match self {
            MessageKind::Execute | MessageKind::BasicResponse => "",
            MessageKind::Response => ":",
            MessageKind::Set => "=",
            MessageKind::Read => "?",
            MessageKind::Test => "=?",
        }
    }
}

/// The fixed vocabulary of unprefixed result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicResponse {
    Ok,
    Connect,
    Ring,
    NoCarrier,
    Error,
    NoDialtone,
    Busy,
    NoAnswer,
}

impl BasicResponse {
    pub const ALL: [BasicResponse; 8] = [
        BasicResponse::Ok,
        BasicResponse::Connect,
        BasicResponse::Ring,
        BasicResponse::NoCarrier,
        BasicResponse::Error,
        BasicResponse::NoDialtone,
        BasicResponse::Busy,
        BasicResponse::NoAnswer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BasicResponse::Ok => "OK",
            BasicResponse::Connect => "CONNECT",
            BasicResponse::Ring => "RING",
            BasicResponse::NoCarrier => "NO CARRIER",
            BasicResponse::Error => "ERROR",
            BasicResponse::NoDialtone => "NO DIALTONE",
            BasicResponse::Busy => "BUSY",
            BasicResponse::NoAnswer => "NO ANSWER",
        }
    }
}

impl FromStr for BasicResponse {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasicResponse::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ParseError::InvalidBasicResponse(s.to_owned()))
    }
}

impl fmt::Display for BasicResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One AT command or response unit
///
/// Messages are immutable once built. Build them with [`Message::at`],
/// [`Message::response`] or [`Message::basic`], or parse them from wire text
/// with [`str::parse`]. `Display` produces the wire text, and for every
/// message built through these constructors with non-ambiguous parameters
/// `text.parse::<Message>()` gives back an equal message.
///
/// ```
/// use hayes::datatypes::{Message, MessageKind, Parameter};
///
/// let message: Message = "+CSQ: 20,0".parse().unwrap();
/// assert_eq!(message.kind(), MessageKind::Response);
/// assert_eq!(message.command(), "+CSQ");
/// assert_eq!(message.parameters(), &[Parameter::Integer(20), Parameter::Integer(0)]);
/// assert_eq!(message.to_string(), "+CSQ: 20,0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    prefix: Option<String>,
    command: String,
    kind: MessageKind,
    outbound: bool,
    parameters: Vec<Parameter>,
}

/// Prefix carried by every outbound command
pub const COMMAND_PREFIX: &str = "AT";

const COMMAND_LEADERS: &[char] = &['+', '\\', '^', '$', '@', '#', '&', '%'];

impl Message {
    /// Build an outbound `AT` command
    pub fn at(command: impl Into<String>, kind: MessageKind, parameters: Vec<Parameter>) -> Self {
        Self {
            prefix: Some(COMMAND_PREFIX.to_owned()),
            command: command.into(),
            kind,
            outbound: true,
            parameters,
        }
    }

    /// Build an inbound tagged response such as `+CSQ: 20,0`
    pub fn response(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            prefix: None,
            command: name.into(),
            kind: MessageKind::Response,
            outbound: false,
            parameters,
        }
    }

    /// Build an inbound basic result code
    pub fn basic(code: BasicResponse) -> Self {
        Self {
            prefix: None,
            command: code.as_str().to_owned(),
            kind: MessageKind::BasicResponse,
            outbound: false,
            parameters: Vec::new(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn is_outbound(&self) -> bool {
        self.outbound
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the basic result code, if this is a `BasicResponse`
    pub fn basic_response(&self) -> Option<BasicResponse> {
        match self.kind {
            MessageKind::BasicResponse => self.command.parse().ok(),
            _ => None,
        }
    }

    /// True for `ERROR` and the extended `+CME ERROR` / `+CMS ERROR` reports
    pub fn is_error(&self) -> bool {
        match self.kind {
            MessageKind::BasicResponse => self.command == BasicResponse::Error.as_str(),
            MessageKind::Response => matches!(self.command.as_str(), "+CME ERROR" | "+CMS ERROR"),
            _ => false,
        }
    }

    /// The wire text without the `AT` prefix, as handed to `Modem::exec_at`
    pub fn body(&self) -> String {
        let mut body = self.command.clone();
        if self.kind != MessageKind::BasicResponse {
            body.push_str(self.kind.separator());
        }
        if self.kind == MessageKind::Response {
            body.push(' ');
        }
        body.push_str(&stringify_parameters(&self.parameters));
        body
    }

    fn parse_command(rest: &str) -> Result<Self, ParseError> {
        let name_len = command_name_len(rest);
        let (command, rest) = rest.split_at(name_len);

        // `=?` must be tried before `=`
        let (kind, rest) = if let Some(rest) = rest.strip_prefix(':') {
            (MessageKind::Response, rest)
        } else if let Some(rest) = rest.strip_prefix("=?") {
            (MessageKind::Test, rest)
        } else if let Some(rest) = rest.strip_prefix('=') {
            (MessageKind::Set, rest)
        } else if let Some(rest) = rest.strip_prefix('?') {
            (MessageKind::Read, rest)
        } else {
            (MessageKind::Execute, rest)
        };

        Ok(Self {
            prefix: Some(COMMAND_PREFIX.to_owned()),
            command: command.to_owned(),
            kind,
            outbound: true,
            parameters: parse_parameters(rest)?,
        })
    }

    fn parse_response(text: &str) -> Result<Self, ParseError> {
        let unrecognized = || ParseError::UnrecognizedMessageFormat(text.to_owned());

        let (name, rest) = text.split_once(':').ok_or_else(unrecognized)?;
        let body = name.strip_prefix(COMMAND_LEADERS).unwrap_or(name);
        let valid_body = !body.is_empty()
            && body
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c.is_whitespace());
        if !valid_body {
            return Err(unrecognized());
        }

        Ok(Self {
            prefix: None,
            command: name.to_owned(),
            kind: MessageKind::Response,
            outbound: false,
            parameters: parse_parameters(rest)?,
        })
    }
}

/// Length in bytes of the command name at the start of `text`: an optional
/// leader character followed by word characters.
fn command_name_len(text: &str) -> usize {
    let mut chars = text.char_indices().peekable();
    let mut end = 0;
    if let Some(&(_, c)) = chars.peek() {
        if COMMAND_LEADERS.contains(&c) {
            end = c.len_utf8();
            chars.next();
        }
    }
    for (index, c) in chars {
        if !(c.is_alphanumeric() || c == '_') {
            break;
        }
        end = index + c.len_utf8();
    }
    end
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = text.parse::<BasicResponse>() {
            return Ok(Message::basic(code));
        }
        if let Some(rest) = text.strip_prefix(COMMAND_PREFIX) {
            return Message::parse_command(rest);
        }
        Message::parse_response(text)
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = ParseError;

    fn try_from(payload: &[u8]) -> Result<Self, Self::Error> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| ParseError::UnrecognizedMessageFormat(String::from_utf8_lossy(payload).into_owned()))?;
        text.parse()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_str(prefix)?;
        }
        f.write_str(&self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_responses() {
        for code in BasicResponse::ALL {
            let message: Message = code.as_str().parse().unwrap();
            assert_eq!(message.kind(), MessageKind::BasicResponse);
            assert!(!message.is_outbound());
            assert!(message.parameters().is_empty());
            assert_eq!(message.prefix(), None);
            assert_eq!(message.basic_response(), Some(code));
        }

        let message: Message = "NO CARRIER".parse().unwrap();
        assert_eq!(message.command(), "NO CARRIER");
        assert_eq!(message.to_string(), "NO CARRIER");
    }

    #[test]
    fn test_parse_outbound_command_kinds() {
        let cases = [
            ("AT+CSQ", "+CSQ", MessageKind::Execute),
            ("AT+CMGF=0", "+CMGF", MessageKind::Set),
            ("AT+CIND?", "+CIND", MessageKind::Read),
            ("AT+CMGL=?", "+CMGL", MessageKind::Test),
            ("ATE0", "E0", MessageKind::Execute),
            ("AT&F", "&F", MessageKind::Execute),
            ("AT", "", MessageKind::Execute),
        ];
        for (text, command, kind) in cases {
            let message: Message = text.parse().unwrap();
            assert_eq!(message.prefix(), Some("AT"), "{text}");
            assert_eq!(message.command(), command, "{text}");
            assert_eq!(message.kind(), kind, "{text}");
            assert!(message.is_outbound());
            assert_eq!(message.to_string(), text);
        }
    }

    #[test]
    fn test_parse_command_parameters() {
        let message: Message = "AT+CMGS=\"+441234\",145".parse().unwrap();
        assert_eq!(
            message.parameters(),
            &[Parameter::String("+441234".into()), Parameter::Integer(145)]
        );
        assert_eq!(message.body(), "+CMGS=\"+441234\",145");
    }

    #[test]
    fn test_parse_tagged_response() {
        let message: Message = "+CMGR: 0,,24".parse().unwrap();
        assert_eq!(message.kind(), MessageKind::Response);
        assert_eq!(message.command(), "+CMGR");
        assert!(!message.is_outbound());
        assert_eq!(
            message.parameters(),
            &[Parameter::Integer(0), Parameter::Empty, Parameter::Integer(24)]
        );
    }

    #[test]
    fn test_parse_response_with_space_in_name() {
        let message: Message = "+CME ERROR: 10".parse().unwrap();
        assert_eq!(message.command(), "+CME ERROR");
        assert!(message.is_error());
        assert!("ERROR".parse::<Message>().unwrap().is_error());
        assert!(!"OK".parse::<Message>().unwrap().is_error());
    }

    #[test]
    fn test_parse_unrecognized_fails() {
        for text in ["07911326040000F0", "hello world", ": 1", "+C-Q: 1"] {
            assert!(
                matches!(
                    text.parse::<Message>(),
                    Err(ParseError::UnrecognizedMessageFormat(_))
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn test_parse_propagates_parameter_errors() {
        assert!(matches!(
            "+CIND: (1,2".parse::<Message>(),
            Err(ParseError::MalformedParameterList { .. })
        ));
    }

    #[test]
    fn test_single_string_response_is_unquoted() {
        let message = Message::response("X", vec![Parameter::String("hello".into())]);
        let text = message.to_string();
        assert!(text.contains("hello"));
        assert!(!text.contains("\"hello\""));
        assert_eq!(text, "X: hello");
        assert_eq!(text.parse::<Message>().unwrap(), message);
    }

    #[test]
    fn test_round_trip_constructed_messages() {
        let messages = vec![
            Message::at("+CSQ", MessageKind::Execute, vec![]),
            Message::at("+CMGF", MessageKind::Set, vec![Parameter::Integer(0)]),
            Message::at("+CPBR", MessageKind::Test, vec![]),
            Message::at("+CIND", MessageKind::Read, vec![]),
            Message::at(
                "+CMGS",
                MessageKind::Set,
                vec![Parameter::String("+4412".into()), Parameter::Integer(145)],
            ),
            Message::response(
                "+CIND",
                vec![
                    Parameter::List(vec![
                        Parameter::String("battchg".into()),
                        Parameter::Range { low: 0, high: 5 },
                    ]),
                    Parameter::Empty,
                    Parameter::Integer(3),
                ],
            ),
            Message::response("+CSQ", vec![Parameter::Integer(20), Parameter::Integer(99)]),
            Message::basic(BasicResponse::NoDialtone),
        ];

        for message in messages {
            let text = message.to_string();
            assert_eq!(text.parse::<Message>().unwrap(), message, "{text}");
        }
    }

    #[test]
    fn test_parse_from_bytes() {
        let message = Message::try_from(&b"+CSQ: 31,99"[..]).unwrap();
        assert_eq!(message.command(), "+CSQ");
    }
}
