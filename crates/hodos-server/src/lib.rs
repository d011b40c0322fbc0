//! # Hodos Server
//!
//! Routing, route groups and the HTTP transport for Hodos.
//!
//! - [`Router`] - ordered route table with subrouters, middleware and
//!   custom 404/405 handlers
//! - [`Group`] - a registration view with its own prefix and extra middleware
//! - [`Server`] - hyper-based HTTP/1.1 transport with graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use hodos_core::{Request, Response, ResponseExt};
//! use hodos_middleware::stages::{LoggingMiddleware, RequestIdMiddleware};
//! use hodos_server::{Router, Server, ServerConfig};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router
//!         .middleware(RequestIdMiddleware::new())
//!         .middleware(LoggingMiddleware::default());
//!
//!     let api = router.subrouter("/api");
//!     api.get("/ping", |_req: Request| async {
//!         Ok(Response::text(StatusCode::OK, "pong"))
//!     })?;
//!
//!     Server::new(ServerConfig::default(), router).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hodos-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod group;
mod route;
mod router;
mod server;
mod shutdown;

pub use config::{ServerConfig, DEFAULT_ADDR, DEFAULT_TIMEOUT};
pub use group::Group;
pub use route::{Metadata, Route, RouteInfo};
pub use router::{AllowedMethods, Outcome, Resolution, Router};
pub use server::{Server, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
