//! Errors raised while assembling a [`HodosConfig`](crate::HodosConfig).

use std::path::PathBuf;

use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("no configuration file at {}", .0.display())]
    Missing(PathBuf),

    /// A file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The io failure.
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type mismatch.
    #[error("malformed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax or type mismatch.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The format is neither `toml` nor `json`.
    #[error("`{name}` is not a supported configuration format")]
    Format {
        /// Extension, format name or file path that was rejected.
        name: String,
    },

    /// A setting parsed but is not usable.
    #[error("{key}: {reason}")]
    Invalid {
        /// Dotted path of the setting, e.g. `server.host`.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An environment override could not be converted.
    #[error("{var}={value:?} is not valid, expected {expected}")]
    Env {
        /// Variable name.
        var: String,
        /// Raw value as found in the environment.
        value: String,
        /// What the setting accepts.
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }

    pub(crate) fn env(var: &str, value: &str, expected: &'static str) -> Self {
        Self::Env {
            var: var.to_owned(),
            value: value.to_owned(),
            expected,
        }
    }

    /// Dotted key or variable name this error is about, if any.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Invalid { key, .. } => Some(key),
            Self::Env { var, .. } => Some(var),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_path() {
        let err = ConfigError::Missing("/etc/hodos.toml".into());
        assert_eq!(err.to_string(), "no configuration file at /etc/hodos.toml");
        assert_eq!(err.subject(), None);
    }

    #[test]
    fn test_invalid_display() {
        let err = ConfigError::invalid("server.request_timeout_secs", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "server.request_timeout_secs: must be greater than zero"
        );
        assert_eq!(err.subject(), Some("server.request_timeout_secs"));
    }

    #[test]
    fn test_env_quotes_value() {
        let err = ConfigError::env("HODOS__SERVER__PORT", "eighty", "a port number");
        assert_eq!(
            err.to_string(),
            r#"HODOS__SERVER__PORT="eighty" is not valid, expected a port number"#
        );
    }
}
