//! # Hodos Core
//!
//! Core types shared by the Hodos router, middleware and server crates:
//!
//! - [`Request`], [`Response`], [`Body`] - buffered `http` types
//! - [`Handler`] - the opaque async handler shape
//! - [`HandlerError`] / [`HandlerResult`] - what handlers return
//! - [`ParamsKey`] / [`RequestExt`] - request-scoped path parameters

#![doc(html_root_url = "https://docs.rs/hodos-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod scope;
mod types;

pub use error::{ErrorBody, ErrorEnvelope, HandlerError, HandlerResult};
pub use handler::{BoxFuture, Handler};
pub use hodos_router::Params;
pub use scope::{ParamStore, ParamsKey, RequestExt};
pub use types::{Body, Request, Response, ResponseExt};
