//! # Hodos Config
//!
//! Typed, layered configuration for the Hodos transport wrapper.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! watch = false
//! shutdown_timeout_secs = 30
//! request_timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Values can be overridden with `HODOS__SERVER__PORT=9000` style variables
//! when the loader is given the `HODOS` prefix.

#![doc(html_root_url = "https://docs.rs/hodos-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{HodosConfig, LoggingSection, ServerSection};
pub use error::ConfigError;
pub use hodos_telemetry::LogFormat;
pub use loader::ConfigLoader;
