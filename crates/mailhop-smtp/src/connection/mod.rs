//! SMTP connection management.

mod config;
mod session;
mod stream;

pub use config::{Config, ConfigBuilder, SMTP_PORT};
pub use session::Session;
pub use stream::{SmtpStream, connect, local_hostname};
