//! # Hodos
//!
//! **HTTP request routing and dispatch**
//!
//! Hodos maps an incoming method and path to a handler through an ordered
//! route table:
//!
//! - **Patterns** with literal segments, `{name}` captures and
//!   `{name:regex}` constrained captures
//! - **Subrouters** mounted under a base path, each owning its 404/405 policy
//! - **Middleware** composed in onion order, per router and per group
//! - **Route metadata** readable through [`server::Router::routes`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hodos::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("HODOS").load()?;
//!
//!     let mut router = Router::new();
//!     router.use_middleware(hodos::standard_middleware(Duration::from_secs(10)));
//!
//!     let key = router.params_key();
//!     router.get("/hello/{name}", move |req: Request| async move {
//!         let name = req.param(key, "name").unwrap_or("world").to_string();
//!         Ok(Response::text(StatusCode::OK, format!("hello {name}")))
//!     })?;
//!
//!     hodos::serve(router, &config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Router::resolve ─┬─ Matched ──────────→ chain(handler)
//!                            ├─ MethodNotAllowed ─→ 405 handler
//!                            └─ NotFound ─────────→ 404 handler
//! ```

#![doc(html_root_url = "https://docs.rs/hodos/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use hodos_config::{ConfigError, HodosConfig};
use hodos_middleware::stages::{
    LoggingMiddleware, RecoveryMiddleware, RequestIdMiddleware, TimeoutMiddleware,
};
use hodos_middleware::BoxedMiddleware;
use hodos_server::{Router, Server, ServerConfig, ServerError};
use hodos_telemetry::TelemetryError;
use thiserror::Error;

// Re-export core types
pub use hodos_core as core;

// Re-export pattern compiler and matcher
pub use hodos_router as router;

// Re-export middleware
pub use hodos_middleware as middleware;

// Re-export router tree and transport
pub use hodos_server as server;

// Re-export configuration
pub use hodos_config as config;

// Re-export logging setup
pub use hodos_telemetry as telemetry;

/// Errors from [`serve`].
#[derive(Debug, Error)]
pub enum ServeError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialised.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The server failed to start.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// The conventional middleware stack, outermost first: request id, logging,
/// panic recovery, then a per-handler timeout.
#[must_use]
pub fn standard_middleware(handler_timeout: Duration) -> Vec<BoxedMiddleware> {
    vec![
        Arc::new(RequestIdMiddleware::new()) as BoxedMiddleware,
        Arc::new(LoggingMiddleware::default()) as BoxedMiddleware,
        Arc::new(RecoveryMiddleware::new()) as BoxedMiddleware,
        Arc::new(TimeoutMiddleware::new(handler_timeout)) as BoxedMiddleware,
    ]
}

/// Validates `config`, initialises logging and serves `router` until
/// SIGTERM or SIGINT.
pub async fn serve(router: Router, config: &HodosConfig) -> Result<(), ServeError> {
    config.validate()?;
    hodos_telemetry::init_logging(&config.log_config())?;

    let server_config = ServerConfig::from(&config.server);
    Server::new(server_config, router).run().await?;
    Ok(())
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use hodos::prelude::*;
///
/// let mut router = Router::new();
/// router
///     .get("/ping", |_req: Request| async {
///         Ok(Response::text(StatusCode::OK, "pong"))
///     })
///     .unwrap();
/// assert_eq!(router.routes().len(), 1);
/// ```
pub mod prelude {
    pub use hodos_core::{
        Body, Handler, HandlerError, HandlerResult, Request, RequestExt, Response, ResponseExt,
    };

    pub use hodos_middleware::{from_fn, BoxedMiddleware, Middleware, Next};

    pub use hodos_server::{Group, Outcome, Router, Server, ServerConfig, ShutdownSignal};

    pub use hodos_config::{ConfigLoader, HodosConfig};

    pub use http::{Method, StatusCode};
}
