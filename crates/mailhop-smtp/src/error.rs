//! Error types for SMTP operations.

use std::io;

use crate::types::ReplyCode;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
///
/// Errors fall into two kinds: connection errors ([`Error::is_connection`])
/// and protocol errors ([`Error::is_protocol`]). [`Error::InvalidState`] is
/// neither; it reports misuse of the session lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connect, read or write failure, timeout, or the server closed the stream.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// Server replied with a code other than the one the current step requires.
    #[error("reply codes don't match: expected {expected}, got {actual} ({text})")]
    UnexpectedReply {
        /// Code required by the protocol step.
        expected: ReplyCode,
        /// Code the server actually sent.
        actual: ReplyCode,
        /// Reply text following the code.
        text: String,
    },

    /// Reply line does not start with a three digit code.
    #[error("malformed reply: {0:?}")]
    MalformedReply(String),

    /// Operation not allowed in the session's current state.
    #[error("invalid state for operation: {0}")]
    InvalidState(String),
}

impl Error {
    /// Creates an unexpected-reply error.
    #[must_use]
    pub fn unexpected_reply(
        expected: ReplyCode,
        actual: ReplyCode,
        text: impl Into<String>,
    ) -> Self {
        Self::UnexpectedReply {
            expected,
            actual,
            text: text.into(),
        }
    }

    /// Creates a connection error for a server that closed the stream.
    #[must_use]
    pub fn connection_closed() -> Self {
        Self::Connection(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "server closed the connection",
        ))
    }

    /// Returns true if this is a connection (transport) error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns true if this is a protocol error (wrong or unparseable reply).
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::UnexpectedReply { .. } | Self::MalformedReply(_))
    }

    /// Returns true if the server rejected the step permanently (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::UnexpectedReply { actual, .. } if actual.is_permanent())
    }

    /// Returns true if the server rejected the step transiently (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::UnexpectedReply { actual, .. } if actual.is_transient())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classifies_connection_errors() {
        let err = Error::connection_closed();
        assert!(err.is_connection());
        assert!(!err.is_protocol());
        match err {
            Error::Connection(io) => assert_eq!(io.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn classifies_protocol_errors() {
        let err = Error::unexpected_reply(ReplyCode::OK, ReplyCode::MAILBOX_UNAVAILABLE, "no");
        assert!(err.is_protocol());
        assert!(err.is_permanent());
        assert!(!err.is_transient());

        assert!(Error::MalformedReply("hi".into()).is_protocol());
        assert!(!Error::InvalidState("sent".into()).is_protocol());
    }

    #[test]
    fn transient_rejection() {
        let err = Error::unexpected_reply(
            ReplyCode::SERVICE_READY,
            ReplyCode::SERVICE_UNAVAILABLE,
            "try later",
        );
        assert!(err.is_transient());
        assert!(!err.is_permanent());
    }

    #[test]
    fn display_keeps_diagnostics() {
        let err = Error::unexpected_reply(ReplyCode::OK, ReplyCode::new(550), "no such user");
        assert_eq!(
            err.to_string(),
            "reply codes don't match: expected 250, got 550 (no such user)"
        );
    }
}
