//! Middleware chain composition.
//!
//! A [`Chain`] is an ordered list of middleware that can wrap a handler. The
//! first middleware in the list is the outermost layer: it sees the request
//! first and the response last.
//!
//! ```text
//! A-before → B-before → handler → B-after → A-after
//! ```

use std::fmt;

use hodos_core::Handler;

use crate::middleware::BoxedMiddleware;

/// An ordered, immutable list of middleware.
///
/// # Example
///
/// ```
/// use hodos_core::{Handler, Request, Response, ResponseExt};
/// use hodos_middleware::{from_fn, Chain, Next};
/// use http::StatusCode;
///
/// let chain = Chain::build(&[
///     from_fn("outer", |req: Request, next: Next| next.run(req)),
///     from_fn("inner", |req: Request, next: Next| next.run(req)),
/// ]);
/// assert_eq!(chain.stage_names(), vec!["outer", "inner"]);
///
/// let handler = chain.then(Handler::new(|_req: Request| async {
///     Ok(Response::empty(StatusCode::OK))
/// }));
/// # let _ = handler;
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    middlewares: Vec<BoxedMiddleware>,
}

impl Chain {
    /// Builds a chain from `middlewares`, preserving their order.
    #[must_use]
    pub fn build(middlewares: &[BoxedMiddleware]) -> Self {
        Self {
            middlewares: middlewares.to_vec(),
        }
    }

    /// Wraps `handler` so that it runs inside every middleware of the chain.
    ///
    /// An empty chain returns `handler` unchanged.
    #[must_use]
    pub fn then(&self, handler: Handler) -> Handler {
        self.middlewares
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    /// Returns a new chain with `other` appended after this chain's stages.
    #[must_use]
    pub fn extend(&self, other: &[BoxedMiddleware]) -> Self {
        let mut middlewares = self.middlewares.clone();
        middlewares.extend_from_slice(other);
        Self { middlewares }
    }

    /// Returns the middleware in order.
    #[must_use]
    pub fn middlewares(&self) -> &[BoxedMiddleware] {
        &self.middlewares
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns true if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stage_names())
            .finish()
    }
}
