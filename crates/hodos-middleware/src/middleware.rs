//! Core middleware trait and types.
//!
//! A middleware is a handler-to-handler decorator: given the next handler in
//! the chain it returns a new handler that may run code before and after the
//! inner one, rewrite the request or response, or short-circuit entirely.
//!
//! # Example
//!
//! ```
//! use hodos_core::Request;
//! use hodos_middleware::{FnMiddleware, Middleware, Next};
//!
//! let stamp = FnMiddleware::new("stamp", |mut request: Request, next: Next| async move {
//!     request.headers_mut().insert("x-stamped", "1".parse().unwrap());
//!     let mut response = next.run(request).await?;
//!     response.headers_mut().insert("x-seen", "1".parse().unwrap());
//!     Ok(response)
//! });
//!
//! assert_eq!(stamp.name(), "stamp");
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use hodos_core::{Handler, HandlerResult, Request};

/// A shared, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The core middleware trait.
///
/// # Invariants
///
/// - `wrap` is called once per chain build, not once per request
/// - the returned handler calls `next` at most once per request
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and debugging.
    fn name(&self) -> &'static str;

    /// Decorates `next`, returning the handler that runs in its place.
    fn wrap(&self, next: Handler) -> Handler;
}

impl<F> Middleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "anonymous"
    }

    fn wrap(&self, next: Handler) -> Handler {
        self(next)
    }
}

/// The remainder of the chain, handed to [`FnMiddleware`] closures.
///
/// Dropping it without calling [`Next::run`] short-circuits the chain.
#[derive(Clone)]
pub struct Next {
    handler: Handler,
}

impl Next {
    pub(crate) fn new(handler: Handler) -> Self {
        Self { handler }
    }

    /// Runs the rest of the chain.
    pub async fn run(self, request: Request) -> HandlerResult {
        self.handler.call(request).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Middleware built from an async closure taking the request and [`Next`].
pub struct FnMiddleware<F> {
    name: &'static str,
    func: Arc<F>,
}

impl<F, Fut> FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Creates a named middleware from `func`.
    pub fn new(name: &'static str, func: F) -> Self {
        Self {
            name,
            func: Arc::new(func),
        }
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn wrap(&self, next: Handler) -> Handler {
        let func = Arc::clone(&self.func);
        Handler::new(move |request| func(request, Next::new(next.clone())))
    }
}

/// Shorthand for [`FnMiddleware::new`] returning a [`BoxedMiddleware`].
pub fn from_fn<F, Fut>(name: &'static str, func: F) -> BoxedMiddleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnMiddleware::new(name, func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hodos_core::{Body, Response, ResponseExt};
    use http::StatusCode;

    fn request() -> Request {
        http::Request::builder().uri("/").body(Body::default()).unwrap()
    }

    fn ok_handler() -> Handler {
        Handler::new(|_req: Request| async { Ok(Response::empty(StatusCode::OK)) })
    }

    #[tokio::test]
    async fn test_fn_middleware_passes_through() {
        let mw = FnMiddleware::new("pass", |req: Request, next: Next| next.run(req));
        let response = mw.wrap(ok_handler()).call(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuits() {
        let mw = FnMiddleware::new("deny", |_req: Request, _next: Next| async {
            Ok(Response::empty(StatusCode::FORBIDDEN))
        });
        let response = mw.wrap(ok_handler()).call(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_closure_middleware() {
        let mw = |next: Handler| {
            Handler::new(move |req: Request| {
                let next = next.clone();
                async move {
                    let mut response = next.call(req).await?;
                    *response.status_mut() = StatusCode::CREATED;
                    Ok(response)
                }
            })
        };

        assert_eq!(mw.name(), "anonymous");
        let response = mw.wrap(ok_handler()).call(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_from_fn_name() {
        let mw = from_fn("named", |req: Request, next: Next| next.run(req));
        assert_eq!(mw.name(), "named");
    }
}
