//! Transport settings for [`Server`](crate::Server).
//!
//! ```rust
//! use hodos_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::new("127.0.0.1:3000")
//!     .with_shutdown_timeout(Duration::from_secs(5));
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:3000");
//! assert_eq!(config.request_timeout(), Duration::from_secs(30));
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use hodos_config::ServerSection;

/// Address used when none is given.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Applies to both the drain window and the body deadline unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to listen and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    addr: String,
    drain: Duration,
    body_deadline: Duration,
    watch: bool,
}

impl ServerConfig {
    /// Listens on `addr` (an `ip:port` literal) with default timeouts.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            drain: DEFAULT_TIMEOUT,
            body_deadline: DEFAULT_TIMEOUT,
            watch: false,
        }
    }

    /// How long shutdown waits for open connections before returning.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, drain: Duration) -> Self {
        self.drain = drain;
        self
    }

    /// Deadline for receiving a whole request body.
    #[must_use]
    pub fn with_request_timeout(mut self, deadline: Duration) -> Self {
        self.body_deadline = deadline;
        self
    }

    /// Records whether watch mode was requested. Reported at startup only.
    #[must_use]
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// The address as configured.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.addr
    }

    /// Parses [`http_addr`](Self::http_addr).
    ///
    /// # Errors
    ///
    /// Fails for host names; only IP literals are accepted.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.addr.parse()
    }

    /// Drain window.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.drain
    }

    /// Body deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.body_deadline
    }

    /// Watch flag.
    #[must_use]
    pub fn watch(&self) -> bool {
        self.watch
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR)
    }
}

impl From<&ServerSection> for ServerConfig {
    fn from(section: &ServerSection) -> Self {
        Self::new(section.http_addr())
            .with_shutdown_timeout(section.shutdown_timeout())
            .with_request_timeout(section.request_timeout())
            .with_watch(section.watch)
    }
}
