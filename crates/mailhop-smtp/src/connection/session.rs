//! Single-use SMTP session.
//!
//! A [`Session`] owns one connection and carries exactly one message:
//!
//! ```text
//! connect ── 220 ──> HELO ── 250 ──> (connected)
//!   send:  MAIL ── 250 ──> RCPT ── 250 ──> DATA ── 354 ──> body "." ── 250
//!   close: QUIT ── 221 ──> release socket
//! ```
//!
//! Every step checks for one specific reply code and stops at the first
//! mismatch. Failures during the handshake or the transaction release the
//! socket before the error is returned.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use super::config::Config;
use super::stream::{self, SmtpStream};
use crate::command::{Command, encode_data};
use crate::error::{Error, Result};
use crate::parser::parse_reply;
use crate::types::{Envelope, Reply, ReplyCode};

/// SMTP session carrying one envelope over one connection.
///
/// Call [`Session::send`] once, then [`Session::close`]. Dropping a session
/// that is still connected releases the socket without sending QUIT.
#[derive(Debug)]
pub struct Session<S = TcpStream> {
    /// `None` once the connection has been released.
    stream: Option<SmtpStream<S>>,
    /// True from a successful HELO until a successful QUIT or an abort.
    connected: bool,
    sent: bool,
}

impl Session<TcpStream> {
    /// Connects to `envelope.dest_host` on port 25 and performs the handshake.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the server cannot be reached, or a
    /// protocol error if the greeting is not 220 or HELO is not answered
    /// with 250.
    pub async fn connect(envelope: &Envelope) -> Result<Self> {
        Self::connect_with(&Config::default(), envelope).await
    }

    /// Connects using an explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`Session::connect`].
    pub async fn connect_with(config: &Config, envelope: &Envelope) -> Result<Self> {
        debug!(host = %envelope.dest_host, port = config.port, "connecting");
        let tcp = stream::connect(&envelope.dest_host, config.port, config.connect_timeout).await?;
        Self::from_stream(tcp, config).await
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Performs the greeting and HELO handshake over an open stream.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the greeting is not 220 or the HELO reply
    /// is not 250, and a connection error on I/O failure. The stream is shut
    /// down before the error is returned.
    pub async fn from_stream(stream: S, config: &Config) -> Result<Self> {
        let mut session = Self {
            stream: Some(SmtpStream::new(stream, config.io_timeout)),
            connected: false,
            sent: false,
        };

        if let Err(err) = session.handshake(config).await {
            warn!(error = %err, "SMTP handshake failed");
            session.release().await;
            return Err(err);
        }

        session.connected = true;
        info!("SMTP session established");
        Ok(session)
    }

    async fn handshake(&mut self, config: &Config) -> Result<()> {
        let greeting = self.read_reply().await?;
        expect(&greeting, ReplyCode::SERVICE_READY)?;

        let hostname = match &config.local_hostname {
            Some(hostname) => hostname.clone(),
            None => stream::local_hostname().await,
        };
        self.send_command(&Command::Helo { hostname }, ReplyCode::OK)
            .await?;
        Ok(())
    }

    /// Sends the envelope: MAIL, RCPT, DATA, then the message body.
    ///
    /// A session carries one message; a second call fails with
    /// [`Error::InvalidState`] without touching the network.
    ///
    /// # Errors
    ///
    /// Returns the first protocol or connection error. The connection is
    /// aborted (released without QUIT) before the error is returned.
    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        if self.sent {
            return Err(Error::InvalidState(
                "a message was already sent on this session".into(),
            ));
        }
        if !self.connected || self.stream.is_none() {
            return Err(Error::InvalidState("session is not connected".into()));
        }
        self.sent = true;

        match self.transaction(envelope).await {
            Ok(()) => {
                info!(recipient = %envelope.recipient, "message accepted");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "mail transaction failed, aborting connection");
                self.connected = false;
                self.release().await;
                Err(err)
            }
        }
    }

    async fn transaction(&mut self, envelope: &Envelope) -> Result<()> {
        let mail = Command::MailFrom {
            from: envelope.sender.clone(),
        };
        self.send_command(&mail, ReplyCode::OK).await?;

        let rcpt = Command::RcptTo {
            to: envelope.recipient.clone(),
        };
        self.send_command(&rcpt, ReplyCode::OK).await?;

        self.send_command(&Command::Data, ReplyCode::START_DATA)
            .await?;

        debug!(bytes = envelope.message.len(), "> <message body>");
        self.exchange(&encode_data(&envelope.message), ReplyCode::OK)
            .await?;
        Ok(())
    }

    /// Ends the session: QUIT if still connected, then release the socket.
    ///
    /// Never fails. Errors are logged. If QUIT fails the session stays
    /// marked connected, so a later call tries QUIT again; with the socket
    /// already released that retry only logs a connection error. After a
    /// successful QUIT further calls do nothing.
    pub async fn close(&mut self) {
        if self.connected {
            match self.send_command(&Command::Quit, ReplyCode::CLOSING).await {
                Ok(_) => self.connected = false,
                Err(err) => warn!(error = %err, "unable to close connection"),
            }
        }
        self.release().await;
    }

    /// Returns true between a successful handshake and a successful QUIT.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Shuts down and drops the stream, if it is still held.
    async fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.shutdown().await {
                warn!(error = %err, "error shutting down connection");
            }
            debug!("connection released");
        }
    }

    /// Sends a command and checks the reply code.
    async fn send_command(&mut self, cmd: &Command, expected: ReplyCode) -> Result<Reply> {
        let data = cmd.serialize();
        debug!(command = cmd.verb(), "> {}", String::from_utf8_lossy(&data).trim_end());
        self.exchange(&data, expected).await
    }

    /// Writes raw protocol bytes, reads one reply and checks its code.
    async fn exchange(&mut self, data: &[u8], expected: ReplyCode) -> Result<Reply> {
        self.stream_mut()?.write_all(data).await?;
        let reply = self.read_reply().await?;
        expect(&reply, expected)?;
        Ok(reply)
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let line = self.stream_mut()?.read_line().await?;
        debug!("< {line}");
        parse_reply(&line)
    }

    fn stream_mut(&mut self) -> Result<&mut SmtpStream<S>> {
        self.stream.as_mut().ok_or_else(|| {
            Error::Connection(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already released",
            ))
        })
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if self.connected && self.stream.is_some() {
            warn!("SMTP session dropped without QUIT, closing connection");
        }
    }
}

fn expect(reply: &Reply, expected: ReplyCode) -> Result<()> {
    if reply.is(expected) {
        Ok(())
    } else {
        Err(Error::unexpected_reply(expected, reply.code, &reply.text))
    }
}
