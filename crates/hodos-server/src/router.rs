//! Request routing and dispatch.
//!
//! A [`Router`] owns an ordered route table, a middleware list and any number
//! of subrouters mounted under a base path. Dispatch works in two stages:
//!
//! 1. **Resolution**: [`Router::resolve`] maps a method and path to a
//!    [`Resolution`] without touching the request
//! 2. **Invocation**: [`Router::dispatch`] stores the captured parameters on
//!    the request and calls the resolved handler
//!
//! # Precedence
//!
//! - Subrouters are checked first, in registration order. The first one whose
//!   base path is a slash-bounded prefix of the request path receives the
//!   whole request, including its 404 and 405 decisions.
//! - Own routes are scanned in registration order. The first route matching
//!   both path and method wins.
//! - If some route matched the path but none matched the method the outcome
//!   is 405, otherwise 404.
//!
//! # Example
//!
//! ```rust
//! use hodos_core::{Request, RequestExt, Response, ResponseExt};
//! use hodos_server::{Outcome, Router};
//! use http::{Method, StatusCode};
//!
//! let mut router = Router::new();
//! let key = router.params_key();
//!
//! router
//!     .get("/users/{id:[0-9]+}", move |req: Request| async move {
//!         let id = req.param(key, "id").unwrap_or_default().to_string();
//!         Ok(Response::text(StatusCode::OK, id))
//!     })
//!     .unwrap();
//!
//! assert_eq!(router.resolve(&Method::GET, "/users/42").outcome(), Outcome::Handled);
//! assert_eq!(router.resolve(&Method::GET, "/users/abc").outcome(), Outcome::NotFound);
//! assert_eq!(
//!     router.resolve(&Method::POST, "/users/42").outcome(),
//!     Outcome::MethodNotAllowed
//! );
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use hodos_core::{
    BoxFuture, Handler, HandlerResult, Params, ParamsKey, Request, RequestExt, Response,
    ResponseExt,
};
use hodos_middleware::{BoxedMiddleware, Chain};
use percent_encoding::percent_decode_str;
use hodos_router::{join_paths, Pattern, PatternError};
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};

use crate::group::Group;
use crate::route::{Route, RouteInfo};

/// Methods registered for a path that did not match the request's method.
///
/// Inserted into the request extensions before a 405 handler runs, so custom
/// handlers can build their own `Allow` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods(pub Vec<Method>);

impl AllowedMethods {
    /// Renders the methods as an `Allow` header value, e.g. `GET, PUT`.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.0
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Terminal state of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched both path and method.
    Handled,
    /// No route matched the path.
    NotFound,
    /// At least one route matched the path, none matched the method.
    MethodNotAllowed,
}

/// Result of resolving a method and path against a router tree.
///
/// Each variant carries the router that made the decision, which is a
/// subrouter when the request was delegated.
#[derive(Debug)]
pub enum Resolution<'r> {
    /// A route matched.
    Matched {
        /// The router owning the route.
        router: &'r Router,
        /// The matched route.
        route: &'r Route,
        /// Parameters captured from the path.
        params: Params,
    },
    /// The path matched but the method did not.
    MethodNotAllowed {
        /// The router that scanned its routes.
        router: &'r Router,
        /// Methods registered on the routes whose pattern matched.
        allowed: Vec<Method>,
    },
    /// Nothing matched.
    NotFound {
        /// The router that scanned its routes.
        router: &'r Router,
    },
}

impl Resolution<'_> {
    /// Returns the terminal state this resolution leads to.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Matched { .. } => Outcome::Handled,
            Self::MethodNotAllowed { .. } => Outcome::MethodNotAllowed,
            Self::NotFound { .. } => Outcome::NotFound,
        }
    }

    /// Returns the router that made the decision.
    #[must_use]
    pub fn router(&self) -> &Router {
        match self {
            Self::Matched { router, .. }
            | Self::MethodNotAllowed { router, .. }
            | Self::NotFound { router } => *router,
        }
    }
}

/// HTTP request router.
///
/// Routers are built on one thread before serving starts and are then shared
/// read-only (typically behind an `Arc`). Dispatch takes `&self` only, so no
/// locking is involved.
pub struct Router {
    routes: Vec<Route>,
    subrouters: Vec<Router>,
    middlewares: Vec<BoxedMiddleware>,
    chain: Chain,
    base_path: String,
    not_found: Option<Handler>,
    method_not_allowed: Option<Handler>,
    params_key: ParamsKey,
}

impl Router {
    /// Creates an empty root router with a fresh [`ParamsKey`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            subrouters: Vec::new(),
            middlewares: Vec::new(),
            chain: Chain::default(),
            base_path: String::new(),
            not_found: None,
            method_not_allowed: None,
            params_key: ParamsKey::unique(),
        }
    }

    /// Returns the key under which this tree stores captured parameters.
    ///
    /// Subrouters return their root's key.
    #[must_use]
    pub fn params_key(&self) -> ParamsKey {
        self.params_key
    }

    /// Returns the base path, empty for a root router.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the middleware chain applied to this router's routes.
    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Registers `handler` for `method` and `pattern`.
    ///
    /// The pattern is joined with the base path of a subrouter.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern does not compile. Nothing is
    /// registered in that case.
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
        self.register(method, pattern, Handler::new(handler), None)
    }

    /// Registers `handler` with opaque metadata attached to the route.
    ///
    /// The metadata is exposed through [`Router::routes`] and never consulted
    /// during dispatch.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern does not compile.
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
        self.register(
            method,
            pattern,
            Handler::new(handler),
            Some(Arc::new(metadata)),
        )
    }

    /// Registers an already built [`Handler`].
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern does not compile.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
    ) -> Result<&mut Self, PatternError> {
        self.register(method, pattern, handler, None)
    }

    pub(crate) fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        metadata: Option<crate::route::Metadata>,
    ) -> Result<&mut Self, PatternError> {
        let full = if self.base_path.is_empty() {
            pattern.to_string()
        } else {
            join_paths(&self.base_path, pattern)
        };
        let compiled = Pattern::compile(&full)?;

        tracing::debug!(
            method = %method,
            pattern = %compiled,
            base_path = %self.base_path,
            "route registered"
        );

        let composed = self.chain.then(handler.clone());
        self.routes
            .push(Route::new(method, compiled, handler, composed, metadata));
        Ok(self)
    }

    /// Registers a `GET` route.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern does not compile.
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
    /// Returns a [`PatternError`] if the pattern does not compile.
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
    /// Returns a [`PatternError`] if the pattern does not compile.
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
    /// Returns a [`PatternError`] if the pattern does not compile.
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
    /// Returns a [`PatternError`] if the pattern does not compile.
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
    /// Returns a [`PatternError`] if the pattern does not compile.
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
    /// Returns a [`PatternError`] if the pattern does not compile.
    pub fn options<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handle(Method::OPTIONS, pattern, handler)
    }

    /// Mounts a static content handler under `prefix`.
    ///
    /// Registers `GET {prefix}/{filepath:.*}`; the handler reads the
    /// remainder of the path from the `filepath` parameter, which may contain
    /// slashes. The router itself knows nothing about files.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if `prefix` does not compile.
    pub fn static_files<F, Fut>(
        &mut self,
        prefix: &str,
        handler: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let pattern = join_paths(prefix, "{filepath:.*}");
        self.handle(Method::GET, &pattern, handler)
    }

    /// Appends middleware and rebuilds the chain.
    ///
    /// Applies to every route of this router, including routes registered
    /// earlier. Subrouters created before this call are not affected.
    pub fn use_middleware<I>(&mut self, middlewares: I) -> &mut Self
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        let added: Vec<BoxedMiddleware> = middlewares.into_iter().collect();
        if added.is_empty() {
            return self;
        }

        self.middlewares.extend(added);
        self.chain = Chain::build(&self.middlewares);
        for route in &mut self.routes {
            let composed = self.chain.then(route.handler().clone());
            route.set_composed(composed);
        }

        tracing::debug!(
            base_path = %self.base_path,
            stages = ?self.chain.stage_names(),
            "middleware chain rebuilt"
        );
        self
    }

    /// Appends a single middleware. See [`Router::use_middleware`].
    pub fn middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: hodos_middleware::Middleware,
    {
        self.use_middleware([Arc::new(middleware) as BoxedMiddleware])
    }

    /// Creates a subrouter mounted at `prefix` and returns it.
    ///
    /// The subrouter inherits the params key, a snapshot of the current
    /// middleware, and the current 404/405 handlers. `prefix` may contain
    /// parameters such as `/users/{id}`; they are captured by the
    /// subrouter's routes.
    pub fn subrouter(&mut self, prefix: &str) -> &mut Router {
        let base_path = join_paths(&self.base_path, prefix);
        tracing::debug!(base_path = %base_path, "subrouter mounted");

        self.subrouters.push(Router {
            routes: Vec::new(),
            subrouters: Vec::new(),
            middlewares: self.middlewares.clone(),
            chain: Chain::build(&self.middlewares),
            base_path,
            not_found: self.not_found.clone(),
            method_not_allowed: self.method_not_allowed.clone(),
            params_key: self.params_key,
        });

        let last = self.subrouters.len() - 1;
        &mut self.subrouters[last]
    }

    /// Returns a registration builder that prefixes patterns with `prefix`
    /// and wraps handlers in `middlewares`.
    ///
    /// Group middleware runs inside this router's own chain.
    pub fn group<I>(&mut self, prefix: &str, middlewares: I) -> Group<'_>
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        let middlewares: Vec<BoxedMiddleware> = middlewares.into_iter().collect();
        Group::new(self, prefix.to_string(), Chain::build(&middlewares))
    }

    /// Sets the handler used when no route matches.
    pub fn not_found<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.not_found = Some(Handler::new(handler));
        self
    }

    /// Sets the handler used when a path matches but its method does not.
    ///
    /// The handler finds the registered methods in the [`AllowedMethods`]
    /// request extension.
    pub fn method_not_allowed<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.method_not_allowed = Some(Handler::new(handler));
        self
    }

    /// Lists every route in this router and its subrouters, depth first in
    /// registration order.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut out = Vec::new();
        self.collect_routes(&mut out);
        out
    }

    fn collect_routes(&self, out: &mut Vec<RouteInfo>) {
        out.extend(self.routes.iter().map(Route::info));
        for sub in &self.subrouters {
            sub.collect_routes(out);
        }
    }

    /// Resolves `method` and `path` without invoking anything.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        if let Some(sub) = self
            .subrouters
            .iter()
            .find(|sub| has_base_prefix(path, &sub.base_path))
        {
            return sub.resolve(method, path);
        }

        let mut allowed: Vec<Method> = Vec::new();
        for route in &self.routes {
            let Some(params) = route.matches(path) else {
                continue;
            };
            if route.method() == method {
                return Resolution::Matched {
                    router: self,
                    route,
                    params,
                };
            }
            if !allowed.contains(route.method()) {
                allowed.push(route.method().clone());
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound { router: self }
        } else {
            Resolution::MethodNotAllowed {
                router: self,
                allowed,
            }
        }
    }

    /// Dispatches `request` and returns the handler's future.
    ///
    /// Resolution happens synchronously; the returned future only runs the
    /// selected handler. Handler errors are returned unchanged.
    pub fn dispatch(&self, mut request: Request) -> BoxFuture<'static, HandlerResult> {
        let path = request.uri().path().to_string();
        let resolution = self.resolve(request.method(), &path);

        tracing::debug!(
            method = %request.method(),
            path = %path,
            outcome = ?resolution.outcome(),
            "request resolved"
        );

        let handler = match resolution {
            Resolution::Matched {
                router,
                route,
                params,
            } => {
                request.set_params(router.params_key, params);
                route.composed().clone()
            }
            Resolution::MethodNotAllowed { router, allowed } => {
                request.extensions_mut().insert(AllowedMethods(allowed));
                router
                    .method_not_allowed
                    .clone()
                    .unwrap_or_else(default_method_not_allowed)
            }
            Resolution::NotFound { router } => router
                .not_found
                .clone()
                .unwrap_or_else(default_not_found),
        };

        handler.call(request)
    }

    /// Converts the router into a [`Handler`], so one router tree can be
    /// mounted as a route of another.
    #[must_use]
    pub fn into_handler(self) -> Handler {
        let router = Arc::new(self);
        Handler::new(move |request| router.dispatch(request))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base_path", &self.base_path)
            .field("routes", &self.routes)
            .field("subrouters", &self.subrouters)
            .field("chain", &self.chain)
            .field("params_key", &self.params_key)
            .finish_non_exhaustive()
    }
}

/// Segment-wise prefix test; an empty base matches every path.
///
/// A `{param}` segment in the base accepts any token. Its constraint, if any,
/// is enforced later by the subrouter's own patterns, which include the base.
fn has_base_prefix(path: &str, base: &str) -> bool {
    let base = base.trim_matches('/');
    if base.is_empty() {
        return true;
    }
    let mut tokens = path.trim_start_matches('/').split('/');
    base.split('/').all(|segment| {
        tokens.next().is_some_and(|token| {
            (segment.starts_with('{') && segment.ends_with('}'))
                || percent_decode_str(token).decode_utf8_lossy() == segment
        })
    })
}

fn default_not_found() -> Handler {
    Handler::new(|request: Request| async move {
        Ok(Response::json_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            &format!("no route for {}", request.uri().path()),
        ))
    })
}

fn default_method_not_allowed() -> Handler {
    Handler::new(|request: Request| async move {
        let mut response = Response::json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            &format!(
                "method {} not allowed for {}",
                request.method(),
                request.uri().path()
            ),
        );
        if let Some(allowed) = request.extensions().get::<AllowedMethods>() {
            if let Ok(value) = HeaderValue::from_str(&allowed.to_header_value()) {
                response.headers_mut().insert(ALLOW, value);
            }
        }
        Ok(response)
    })
}
