//! # Hodos Middleware
//!
//! Middleware composition for the Hodos router.
//!
//! A [`Middleware`] decorates a [`Handler`](hodos_core::Handler), returning a
//! new handler that runs around it. A [`Chain`] folds an ordered list of
//! middleware over a handler so that the first registered middleware is the
//! outermost layer:
//!
//! ```text
//! request → A → B → handler → B → A → response
//! ```
//!
//! Ready-made stages (request IDs, logging, panic recovery, timeouts) live in
//! [`stages`].

#![doc(html_root_url = "https://docs.rs/hodos-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod stages;

pub use chain::Chain;
pub use middleware::{from_fn, BoxedMiddleware, FnMiddleware, Middleware, Next};
