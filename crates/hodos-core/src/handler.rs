//! The handler abstraction.
//!
//! A [`Handler`] is an opaque, cheaply clonable async function from a
//! [`Request`] to a [`HandlerResult`]. Route handlers, 404/405 handlers and
//! the functions produced by middleware all share this one shape.
//!
//! Registration APIs take closures directly and wrap them with
//! [`Handler::new`]; the bounds on that constructor are what let closure
//! argument and error types be inferred.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HandlerResult;
use crate::types::Request;

/// A boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type HandlerFn = dyn Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// A type-erased request handler.
///
/// # Example
///
/// ```
/// use hodos_core::{Handler, Request, Response, ResponseExt};
/// use http::StatusCode;
///
/// let handler = Handler::new(|_req: Request| async {
///     Ok(Response::text(StatusCode::OK, "pong"))
/// });
///
/// // Handlers are reference counted; clones share the same function.
/// let _copy = handler.clone();
/// ```
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps an async function as a handler.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |request| Box::pin(func(request))),
        }
    }

    /// Invokes the handler.
    pub fn call(&self, request: Request) -> BoxFuture<'static, HandlerResult> {
        (self.inner)(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
