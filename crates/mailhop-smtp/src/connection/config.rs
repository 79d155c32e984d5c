//! Connection configuration types.

use std::time::Duration;

/// Standard SMTP port.
pub const SMTP_PORT: u16 = 25;

/// SMTP session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server port.
    pub port: u16,
    /// Name sent with HELO. Looked up from the platform when `None`.
    pub local_hostname: Option<String>,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Timeout for each read or write.
    pub io_timeout: Duration,
}

impl Config {
    /// Creates a configuration for plain SMTP on port 25.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            port: SMTP_PORT,
            local_hostname: None,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the hostname announced with HELO.
    #[must_use]
    pub fn local_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.local_hostname = Some(hostname.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the read/write timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
