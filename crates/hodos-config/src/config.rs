//! Configuration types.
//!
//! All sections deny unknown fields and fall back to defaults for fields a
//! file leaves out.

use std::net::SocketAddr;
use std::time::Duration;

use hodos_telemetry::{create_env_filter, LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Root configuration for a Hodos server.
///
/// # Example
///
/// ```
/// use hodos_config::HodosConfig;
///
/// let config = HodosConfig::default();
/// assert_eq!(config.server.http_addr(), "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HodosConfig {
    /// Listener and transport settings.
    pub server: ServerSection,
    /// Logging settings.
    pub logging: LoggingSection,
}

/// Listener and transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Interface to bind.
    pub host: String,
    /// Port to bind; 0 picks an ephemeral port.
    pub port: u16,
    /// Development watch mode flag. Reported at startup; reloading is left
    /// to an external tool.
    pub watch: bool,
    /// How long to wait for open connections on shutdown.
    pub shutdown_timeout_secs: u64,
    /// Deadline for reading a request body.
    pub request_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            watch: false,
            shutdown_timeout_secs: 30,
            request_timeout_secs: 30,
        }
    }
}

impl ServerSection {
    /// Returns `host:port`.
    #[must_use]
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Returns the request body timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Whether to install a subscriber.
    pub enabled: bool,
    /// Filter directive.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Whether to log span open/close events.
    pub span_events: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
        }
    }
}

impl From<&LoggingSection> for LogConfig {
    fn from(section: &LoggingSection) -> Self {
        Self {
            enabled: section.enabled,
            level: section.level.clone(),
            format: section.format,
            span_events: section.span_events,
            file_line_info: section.format != LogFormat::Json,
            include_target: true,
        }
    }
}

impl HodosConfig {
    /// Local development preset: loopback, watch mode, pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSection {
                host: "127.0.0.1".to_string(),
                watch: true,
                shutdown_timeout_secs: 1,
                ..ServerSection::default()
            },
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                span_events: true,
                ..LoggingSection::default()
            },
        }
    }

    /// Production preset: the defaults.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Returns the logging configuration for `hodos_telemetry::init_logging`.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from(&self.logging)
    }

    /// Checks values that the types alone do not constrain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }

        let addr = self.server.http_addr();
        if addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid(
                "server.host",
                format!("invalid socket address: {addr}"),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_secs",
                "must be greater than zero",
            ));
        }

        if let Err(e) = create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid("logging.level", e.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HodosConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.watch);
        assert_eq!(config.server.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_development_preset() {
        let config = HodosConfig::development();
        assert_eq!(config.server.http_addr(), "127.0.0.1:8080");
        assert!(config.server.watch);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HodosConfig = toml::from_str("[server]\nport = 3000\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<HodosConfig, _> = toml::from_str("[server]\nprot = 3000\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_host() {
        let mut config = HodosConfig::default();
        config.server.host = "not a host".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "server.host"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = HodosConfig::default();
        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = HodosConfig::default();
        config.logging.level = "hodos=loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { key, .. } if key == "logging.level")
        );
    }

    #[test]
    fn test_log_config_conversion() {
        let log = HodosConfig::development().log_config();
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(log.span_events);
        assert!(log.file_line_info);
    }
}
