//! SMTP reply parser.
//!
//! Each server line is treated as one reply. Only the first three characters
//! decide control flow; they must be ASCII digits. Whatever follows is kept
//! as text for diagnostics. Multi-line replies (`250-...` continuations) are
//! not assembled: the first line read is the reply.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses a reply line such as `250 OK` or `354-continue`.
///
/// The line may still carry its trailing CRLF; it is ignored.
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if the line is shorter than three
/// characters or does not start with three digits.
pub fn parse_reply(line: &str) -> Result<Reply> {
    let line = line.trim_end_matches(['\r', '\n']);
    let code = parse_reply_code(line)?;

    // The first three bytes are ASCII digits, so index 3 is a char boundary.
    let rest = &line[3..];
    let text = rest.strip_prefix([' ', '-']).unwrap_or(rest);

    Ok(Reply::new(code, text))
}

/// Parses just the leading reply code of a line.
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if the line does not start with three
/// ASCII digits.
pub fn parse_reply_code(line: &str) -> Result<ReplyCode> {
    let digits = match line.as_bytes().get(..3) {
        Some(digits) if digits.iter().all(u8::is_ascii_digit) => digits,
        _ => return Err(Error::MalformedReply(line.to_string())),
    };

    let code = digits
        .iter()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
    Ok(ReplyCode::new(code))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line_reply() {
        let reply = parse_reply("250 OK").unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.text, "OK");
    }

    #[test]
    fn test_parse_continuation_line() {
        let reply = parse_reply("354-continue").unwrap();
        assert_eq!(reply.code, ReplyCode::START_DATA);
        assert_eq!(reply.text, "continue");
    }

    #[test]
    fn test_parse_bare_code() {
        let reply = parse_reply("250").unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert!(reply.text.is_empty());
    }

    #[test]
    fn test_parse_without_separator() {
        let reply = parse_reply("221Bye").unwrap();
        assert_eq!(reply.code, ReplyCode::CLOSING);
        assert_eq!(reply.text, "Bye");
    }

    #[test]
    fn test_parse_strips_line_ending() {
        let reply = parse_reply("220 mx.example.com ready\r\n").unwrap();
        assert_eq!(reply.code, ReplyCode::SERVICE_READY);
        assert_eq!(reply.text, "mx.example.com ready");
    }

    #[test]
    fn test_parse_non_ascii_text() {
        let reply = parse_reply("550 utilisateur inconnu é").unwrap();
        assert_eq!(reply.code, ReplyCode::MAILBOX_UNAVAILABLE);
        assert_eq!(reply.text, "utilisateur inconnu é");
    }

    #[test]
    fn test_parse_error_too_short() {
        assert!(matches!(parse_reply("25"), Err(Error::MalformedReply(_))));
        assert!(matches!(parse_reply(""), Err(Error::MalformedReply(_))));
    }

    #[test]
    fn test_parse_error_non_digit() {
        assert!(matches!(parse_reply("ABC OK"), Err(Error::MalformedReply(_))));
        assert!(matches!(parse_reply("2x0 OK"), Err(Error::MalformedReply(_))));
        assert!(matches!(parse_reply("+25 OK"), Err(Error::MalformedReply(_))));
        assert!(matches!(parse_reply(" 250 OK"), Err(Error::MalformedReply(_))));
    }

    #[test]
    fn test_parse_error_is_protocol() {
        assert!(parse_reply("hello").unwrap_err().is_protocol());
    }
}
