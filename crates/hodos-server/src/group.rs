//! Registration-time route groups.
//!
//! A [`Group`] is sugar over router registration: it prefixes patterns and
//! wraps handlers in its own middleware before forwarding them to the router
//! it borrows. Dispatch never sees groups.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use hodos_core::{Handler, HandlerResult, Request};
use hodos_middleware::{BoxedMiddleware, Chain};
use hodos_router::{join_paths, PatternError};
use http::Method;

use crate::route::Metadata;
use crate::router::Router;

/// A prefix and middleware list applied to routes registered through it.
///
/// # Example
///
/// ```rust
/// use hodos_core::{Request, Response, ResponseExt};
/// use hodos_middleware::from_fn;
/// use hodos_server::Router;
/// use http::StatusCode;
///
/// let mut router = Router::new();
/// let auth = from_fn("auth", |req: Request, next: hodos_middleware::Next| next.run(req));
///
/// router
///     .group("/admin", [auth])
///     .get("/stats", |_req: Request| async { Ok(Response::empty(StatusCode::OK)) })
///     .unwrap();
///
/// assert_eq!(router.routes()[0].pattern, "/admin/stats");
/// ```
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    chain: Chain,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String, chain: Chain) -> Self {
        Self {
            router,
            prefix,
            chain,
        }
    }

    /// Returns the group prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers `handler` under the group prefix, wrapped in the group's
    /// middleware.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn handle<F, Fut>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route(method, pattern, Handler::new(handler))
    }

    /// Registers an already built [`Handler`] under the group prefix.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
    ) -> Result<&mut Self, PatternError> {
        self.forward(method, pattern, handler, None)
    }

    /// Registers `handler` under the group prefix with route metadata, as
    /// [`Router::handle_with_metadata`] does.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn handle_with_metadata<F, Fut, M>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
        metadata: M,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
        M: Any + Send + Sync,
    {
        self.forward(
            method,
            pattern,
            Handler::new(handler),
            Some(Arc::new(metadata)),
        )
    }

    fn forward(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        metadata: Option<Metadata>,
    ) -> Result<&mut Self, PatternError> {
        let full = join_paths(&self.prefix, pattern);
        let wrapped = self.chain.then(handler);
        self.router.register(method, &full, wrapped, metadata)?;
        Ok(self)
    }

    /// Registers a `GET` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn get<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::GET, pattern, handler)
    }

    /// Registers a `POST` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn post<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::POST, pattern, handler)
    }

    /// Registers a `PUT` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn put<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::PUT, pattern, handler)
    }

    /// Registers a `PATCH` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn patch<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::PATCH, pattern, handler)
    }

    /// Registers a `DELETE` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn delete<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Registers a `HEAD` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn head<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::HEAD, pattern, handler)
    }

    /// Registers an `OPTIONS` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the joined pattern does not compile.
    pub fn options<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::OPTIONS, pattern, handler)
    }

    /// Creates a nested group. Prefixes are joined and the nested group's
    /// middleware runs inside this group's.
    pub fn group<I>(&mut self, prefix: &str, middlewares: I) -> Group<'_>
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        let middlewares: Vec<BoxedMiddleware> = middlewares.into_iter().collect();
        Group::new(
            self.router,
            join_paths(&self.prefix, prefix),
            self.chain.extend(&middlewares),
        )
    }
}

impl std::fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("chain", &self.chain)
            .field("base_path", &self.router.base_path())
            .finish()
    }
}
