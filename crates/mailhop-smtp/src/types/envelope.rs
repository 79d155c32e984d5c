//! Message envelope supplied by the caller.

/// Everything needed to deliver one message: where, from whom, to whom, what.
///
/// Addresses are passed to the server as given. Checking them is the
/// server's job, reported through its reply codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Host of the mail server to connect to.
    pub dest_host: String,
    /// Sender address for `MAIL FROM`.
    pub sender: String,
    /// Recipient address for `RCPT TO`.
    pub recipient: String,
    /// Message content (headers and body), lines separated by CRLF or LF.
    pub message: String,
}

impl Envelope {
    /// Creates a new envelope.
    #[must_use]
    pub fn new(
        dest_host: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            dest_host: dest_host.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_fields_verbatim() {
        let envelope = Envelope::new(
            "mx.example.com",
            "not an address",
            "bob@example.org",
            "Subject: hi\r\n\r\nhello\r\n",
        );
        assert_eq!(envelope.dest_host, "mx.example.com");
        assert_eq!(envelope.sender, "not an address");
        assert_eq!(envelope.recipient, "bob@example.org");
        assert_eq!(envelope.message, "Subject: hi\r\n\r\nhello\r\n");
    }
}
