//! SMTP command builder.

/// Line terminator for everything the client sends.
pub const CRLF: &[u8] = b"\r\n";

/// End-of-data marker that closes the DATA phase.
pub const END_OF_DATA: &[u8] = b".\r\n";

/// RFC 821 command issued by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// HELO - Identify the client
    Helo {
        /// Client hostname
        hostname: String,
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Reverse-path (sender address)
        from: String,
    },
    /// RCPT TO - Name the recipient
    RcptTo {
        /// Forward-path (recipient address)
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// QUIT - Close the transmission channel
    Quit,
}

impl Command {
    /// Returns the command verb, for logging.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Helo { .. } => "HELO",
            Self::MailFrom { .. } => "MAIL",
            Self::RcptTo { .. } => "RCPT",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }

    /// Serializes the command to bytes, CRLF included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Helo { hostname } => {
                buf.extend_from_slice(b"HELO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:");
                push_path(&mut buf, from);
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:");
                push_path(&mut buf, to);
            }
            Self::Data => buf.extend_from_slice(b"DATA"),
            Self::Quit => buf.extend_from_slice(b"QUIT"),
        }

        buf.extend_from_slice(CRLF);
        buf
    }
}

/// Writes an address as an angle-bracketed path, keeping brackets the
/// caller already supplied.
///
/// The caller's text is trimmed of surrounding whitespace and wrapped; it is
/// not otherwise checked or rewritten.
fn push_path(buf: &mut Vec<u8>, address: &str) {
    let address = address.trim();
    if address.starts_with('<') && address.ends_with('>') {
        buf.extend_from_slice(address.as_bytes());
    } else {
        buf.push(b'<');
        buf.extend_from_slice(address.as_bytes());
        buf.push(b'>');
    }
}

/// Encodes a message body for the DATA phase, terminator included.
///
/// Bare LF and CRLF line endings both become CRLF, lines starting with `.`
/// get an extra `.` (RFC 821 §4.5.2), a missing final line ending is
/// supplied, and the `.` terminator line is appended.
#[must_use]
pub fn encode_data(message: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(message.len() + 16);

    let body = message.strip_suffix('\n').unwrap_or(message);
    let body = body.strip_suffix('\r').unwrap_or(body);

    if !message.is_empty() {
        for line in body.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.starts_with('.') {
                buf.push(b'.');
            }
            buf.extend_from_slice(line.as_bytes());
            buf.extend_from_slice(CRLF);
        }
    }

    buf.extend_from_slice(END_OF_DATA);
    buf
}
