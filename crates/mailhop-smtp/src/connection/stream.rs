//! Low-level SMTP stream handling.
//!
//! Line framing over any async byte stream, plus TCP connect and local
//! hostname resolution for the real network path.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

#[cfg(unix)]
use dns_lookup::AddrInfoHints;

use crate::error::{Error, Result};

/// Maximum reply line length accepted from the server.
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Hostname used for HELO when the platform gives us nothing usable.
const FALLBACK_HOSTNAME: &str = "localhost";

/// Line-oriented SMTP stream with per-operation timeouts.
#[derive(Debug)]
pub struct SmtpStream<S> {
    reader: BufReader<S>,
    io_timeout: Duration,
}

impl<S> SmtpStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected byte stream.
    pub fn new(stream: S, io_timeout: Duration) -> Self {
        Self {
            reader: BufReader::new(stream),
            io_timeout,
        }
    }

    /// Reads one line, without its line ending.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the read fails, times out, or the server
    /// closed the stream, and [`Error::MalformedReply`] if the line exceeds
    /// the length limit.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let mut limited = (&mut self.reader).take(MAX_LINE_LENGTH as u64);
        let read = with_timeout(self.io_timeout, limited.read_until(b'\n', &mut buf)).await?;

        if read == 0 {
            return Err(Error::connection_closed());
        }
        if !buf.ends_with(b"\n") && buf.len() >= MAX_LINE_LENGTH {
            return Err(Error::MalformedReply(format!(
                "reply line exceeds {MAX_LINE_LENGTH} bytes"
            )));
        }

        let line = String::from_utf8_lossy(&buf);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        with_timeout(self.io_timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await?;
        Ok(())
    }

    /// Shuts down the write half, signalling the server we are done.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the shutdown fails or times out.
    pub async fn shutdown(&mut self) -> Result<()> {
        let stream = self.reader.get_mut();
        with_timeout(self.io_timeout, stream.shutdown()).await?;
        Ok(())
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns a connection error if the connection fails or times out.
pub async fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let stream = with_timeout(timeout, TcpStream::connect((hostname, port))).await?;
    Ok(stream)
}

/// Returns the local machine's canonical hostname.
///
/// The name from `gethostname` is resolved through the platform resolver
/// (`getaddrinfo` with `AI_CANONNAME`). If that fails the plain name is
/// used, and `localhost` if the plain name is empty or not valid UTF-8.
pub async fn local_hostname() -> String {
    tokio::task::spawn_blocking(|| {
        let short = gethostname::gethostname().into_string().ok();
        choose_hostname(short, canonical_name)
    })
    .await
    .unwrap_or_else(|_| FALLBACK_HOSTNAME.to_string())
}

/// Picks the HELO name: canonical name, then plain name, then `localhost`.
fn choose_hostname(
    short: Option<String>,
    resolve: impl FnOnce(&str) -> Option<String>,
) -> String {
    let Some(short) = short.filter(|name| !name.trim().is_empty()) else {
        return FALLBACK_HOSTNAME.to_string();
    };

    match resolve(&short).filter(|name| !name.trim().is_empty()) {
        Some(canonical) => canonical,
        None => {
            debug!(hostname = %short, "no canonical name for local host");
            short
        }
    }
}

#[cfg(unix)]
fn canonical_name(host: &str) -> Option<String> {
    let hints = AddrInfoHints {
        socktype: 0,
        protocol: 0,
        address: 0,
        flags: libc::AI_CANONNAME,
    };

    dns_lookup::getaddrinfo(Some(host), None, Some(hints))
        .ok()?
        .filter_map(io::Result::ok)
        .find_map(|info| info.canonname)
}

#[cfg(not(unix))]
fn canonical_name(_host: &str) -> Option<String> {
    None
}

async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "SMTP operation timed out"))?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_read_line_strips_crlf() {
        let mock = Builder::new().read(b"220 ready\r\n250 ok\n").build();
        let mut stream = SmtpStream::new(mock, TIMEOUT);

        assert_eq!(stream.read_line().await.unwrap(), "220 ready");
        assert_eq!(stream.read_line().await.unwrap(), "250 ok");
    }

    #[tokio::test]
    async fn test_read_line_across_chunks() {
        let mock = Builder::new().read(b"250 pa").read(b"rtial\r\n").build();
        let mut stream = SmtpStream::new(mock, TIMEOUT);

        assert_eq!(stream.read_line().await.unwrap(), "250 partial");
    }

    #[tokio::test]
    async fn test_read_line_eof_is_connection_error() {
        let mock = Builder::new().build();
        let mut stream = SmtpStream::new(mock, TIMEOUT);

        let err = stream.read_line().await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_read_error_is_connection_error() {
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut stream = SmtpStream::new(mock, TIMEOUT);

        let err = stream.read_line().await.unwrap_err();
        assert!(matches!(err, Error::Connection(ref io) if io.kind() == io::ErrorKind::ConnectionReset));
    }

    #[tokio::test]
    async fn test_write_all() {
        let mock = Builder::new().write(b"QUIT\r\n").build();
        let mut stream = SmtpStream::new(mock, TIMEOUT);

        stream.write_all(b"QUIT\r\n").await.unwrap();
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (client, _server) = tokio::io::duplex(64);
        let mut stream = SmtpStream::new(client, Duration::from_millis(20));

        let err = stream.read_line().await.unwrap_err();
        assert!(matches!(err, Error::Connection(ref io) if io.kind() == io::ErrorKind::TimedOut));
    }

    #[tokio::test]
    async fn test_local_hostname_not_empty() {
        assert!(!local_hostname().await.is_empty());
    }

    #[test]
    fn test_hostname_prefers_canonical_name() {
        let name = choose_hostname(Some("vm".into()), |short| {
            assert_eq!(short, "vm");
            Some("vm.lab.example.com".into())
        });
        assert_eq!(name, "vm.lab.example.com");
    }

    #[test]
    fn test_hostname_falls_back_to_plain_name() {
        assert_eq!(choose_hostname(Some("vm".into()), |_| None), "vm");
        assert_eq!(choose_hostname(Some("vm".into()), |_| Some(String::new())), "vm");
    }

    #[test]
    fn test_hostname_falls_back_to_localhost() {
        let unresolved = |_: &str| -> Option<String> { panic!("nothing to resolve") };
        assert_eq!(choose_hostname(None, unresolved), "localhost");
        assert_eq!(choose_hostname(Some("  ".into()), unresolved), "localhost");
    }

    #[cfg(unix)]
    #[test]
    fn test_canonical_name_of_localhost() {
        // Resolution depends on the host's configuration; just make sure the
        // lookup never yields an empty name.
        if let Some(name) = canonical_name("localhost") {
            assert!(!name.is_empty());
        }
    }
}
