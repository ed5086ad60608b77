//! Line framing for the modem byte stream
//!
//! Modems answer with `\r\n`-terminated lines that may arrive split across
//! any number of reads. Bytes accumulate in a `BytesMut` until a `\n` is
//! seen; every complete line is then split off and the unterminated tail
//! stays buffered for the next read.

use bytes::{Buf, BytesMut};

/// Byte that terminates a frame
pub const LINE_TERMINATOR: u8 = b'\n';

/// Split the next complete line off the front of `buf`
///
/// The terminator and any trailing `\r` are removed. Returns `None` when no
/// complete line has been buffered yet; the partial data is left in place.
pub fn parse_line(buf: &mut BytesMut) -> Option<String> {
    let end = buf.iter().position(|&byte| byte == LINE_TERMINATOR)?;
    let line = buf.split_to(end);
    buf.advance(1);

    let text = String::from_utf8_lossy(&line);
    Some(text.trim_end_matches('\r').trim().to_owned())
}

/// True for lines that complete an in-flight command: `OK`, `ERROR` or any
/// `+`-prefixed information response
pub fn is_response(line: &str) -> bool {
    line == "OK" || line == "ERROR" || line.starts_with('+')
}

/// True for final result codes that report failure
pub fn is_error(line: &str) -> bool {
    line == "ERROR" || line.starts_with("+CME ERROR") || line.starts_with("+CMS ERROR")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_lines() {
        let mut buf = BytesMut::from(&b"OK\r\n+CSQ: 20,99\r\n"[..]);
        assert_eq!(parse_line(&mut buf).as_deref(), Some("OK"));
        assert_eq!(parse_line(&mut buf).as_deref(), Some("+CSQ: 20,99"));
        assert_eq!(parse_line(&mut buf), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut buf = BytesMut::from(&b"+CMTI: \"SM\""[..]);
        assert_eq!(parse_line(&mut buf), None);
        assert_eq!(&buf[..], b"+CMTI: \"SM\"");

        buf.extend_from_slice(b",3\r\nOK");
        assert_eq!(parse_line(&mut buf).as_deref(), Some("+CMTI: \"SM\",3"));
        assert_eq!(parse_line(&mut buf), None);
        assert_eq!(&buf[..], b"OK");
    }

    #[test]
    fn test_blank_lines_are_empty() {
        let mut buf = BytesMut::from(&b"\r\n\r\nRING\r\n"[..]);
        assert_eq!(parse_line(&mut buf).as_deref(), Some(""));
        assert_eq!(parse_line(&mut buf).as_deref(), Some(""));
        assert_eq!(parse_line(&mut buf).as_deref(), Some("RING"));
    }

    #[test]
    fn test_response_classification() {
        assert!(is_response("OK"));
        assert!(is_response("ERROR"));
        assert!(is_response("+CME ERROR: 10"));
        assert!(is_response("+CSQ: 20,99"));
        assert!(!is_response("RING"));
        assert!(!is_response("AT+CSQ"));
        assert!(!is_response("0791..."));

        assert!(is_error("+CMS ERROR: 321"));
        assert!(!is_error("OK"));
    }
}
