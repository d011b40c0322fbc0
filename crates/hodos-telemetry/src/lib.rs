//! # Hodos Telemetry
//!
//! Logging initialisation shared by Hodos binaries and tests. Library crates
//! only emit `tracing` events; this crate decides where they go.

#![doc(html_root_url = "https://docs.rs/hodos-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
