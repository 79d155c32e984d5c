//! # mailhop-smtp
//!
//! A single-shot SMTP client implementing the RFC 821 exchange: one
//! connection, one envelope, then QUIT.
//!
//! ## Features
//!
//! - **Strict sequencing**: each step requires one specific reply code and
//!   the session stops at the first mismatch
//! - **No leaked sockets**: failed handshakes and aborted transactions
//!   release the connection before returning the error
//! - **Plain RFC 821**: HELO, MAIL, RCPT, DATA, QUIT. No ESMTP, AUTH or TLS
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailhop_smtp::{Config, Envelope, send_mail};
//!
//! # async fn run() -> mailhop_smtp::Result<()> {
//! let envelope = Envelope::new(
//!     "mx.example.com",
//!     "alice@example.org",
//!     "bob@example.com",
//!     "Subject: Hello\r\n\r\nHi Bob!\r\n",
//! );
//!
//! send_mail(&Config::default(), &envelope).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Driving a [`Session`] by hand gives the same result; `close` must then be
//! called on every path:
//!
//! ```no_run
//! use mailhop_smtp::{Envelope, Session};
//!
//! # async fn run(envelope: Envelope) -> mailhop_smtp::Result<()> {
//! let mut session = Session::connect(&envelope).await?;
//! let result = session.send(&envelope).await;
//! session.close().await;
//! result
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders and DATA encoding
//! - [`connection`]: Configuration, framing and the session
//! - [`parser`]: Reply line parser
//! - [`types`]: Envelope and reply types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{Config, ConfigBuilder, Session};
pub use error::{Error, Result};
pub use types::{Envelope, Reply, ReplyCode};

/// Connects, sends one envelope and closes the session on every path.
///
/// # Errors
///
/// Returns the connection or protocol error of the handshake or of the
/// mail transaction. Errors while closing are logged, not returned.
pub async fn send_mail(config: &Config, envelope: &Envelope) -> Result<()> {
    let mut session = Session::connect_with(config, envelope).await?;
    let result = session.send(envelope).await;
    session.close().await;
    result
}
