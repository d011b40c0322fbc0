//! Registered routes and their read-only views.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hodos_core::{Handler, Params};
use hodos_router::Pattern;
use http::Method;

/// Opaque per-route metadata, stored untouched and never read by dispatch.
pub type Metadata = Arc<dyn Any + Send + Sync>;

/// A registered route.
///
/// Routes are owned by the router they were registered on and are immutable
/// once registered, apart from the composed handler which is re-derived
/// whenever the owning router's middleware changes.
pub struct Route {
    method: Method,
    pattern: Pattern,
    handler: Handler,
    composed: Handler,
    metadata: Option<Metadata>,
}

impl Route {
    pub(crate) fn new(
        method: Method,
        pattern: Pattern,
        handler: Handler,
        composed: Handler,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            method,
            pattern,
            handler,
            composed,
            metadata,
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the compiled pattern, including any subrouter base path.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the route metadata, if any was registered.
    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// The handler as registered, before router middleware.
    pub(crate) fn handler(&self) -> &Handler {
        &self.handler
    }

    /// The handler wrapped in the owning router's middleware chain.
    pub(crate) fn composed(&self) -> &Handler {
        &self.composed
    }

    pub(crate) fn set_composed(&mut self, composed: Handler) {
        self.composed = composed;
    }

    pub(crate) fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.matches(path)
    }

    pub(crate) fn info(&self) -> RouteInfo {
        RouteInfo {
            method: self.method.clone(),
            pattern: self.pattern.as_str().to_string(),
            metadata: self.metadata.clone(),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("metadata", &self.metadata.is_some())
            .finish_non_exhaustive()
    }
}

/// Description of a registered route, as returned by `Router::routes`.
#[derive(Clone)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: Method,
    /// Full pattern source, including any subrouter base path.
    pub pattern: String,
    /// Route metadata, if any.
    pub metadata: Option<Metadata>,
}

impl RouteInfo {
    /// Returns the metadata downcast to `T`.
    ///
    /// ```
    /// use hodos_server::Router;
    ///
    /// struct Summary(&'static str);
    ///
    /// let mut router = Router::new();
    /// router
    ///     .handle_with_metadata(
    ///         http::Method::GET,
    ///         "/users",
    ///         |_req| async { Ok(hodos_core::Response::default()) },
    ///         Summary("list users"),
    ///     )
    ///     .unwrap();
    ///
    /// let routes = router.routes();
    /// assert_eq!(routes[0].metadata_as::<Summary>().unwrap().0, "list users");
    /// ```
    #[must_use]
    pub fn metadata_as<T: Any>(&self) -> Option<&T> {
        self.metadata.as_deref().and_then(|m| m.downcast_ref::<T>())
    }
}

impl fmt::Debug for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteInfo")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("metadata", &self.metadata.is_some())
            .finish()
    }
}
