//! Handler deadline middleware.

use std::time::Duration;

use hodos_core::{Handler, HandlerError, Request};

use crate::middleware::Middleware;

/// Middleware that fails requests running longer than a deadline.
///
/// The inner future is dropped when the deadline passes and the request
/// fails with [`HandlerError::Timeout`] (504).
#[derive(Debug, Clone, Copy)]
pub struct TimeoutMiddleware {
    duration: Duration,
}

impl TimeoutMiddleware {
    /// Creates a timeout middleware with the given deadline.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Returns the configured deadline.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Middleware for TimeoutMiddleware {
    fn name(&self) -> &'static str {
        "timeout"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let duration = self.duration;

        Handler::new(move |request: Request| {
            let next = next.clone();
            async move {
                if let Ok(result) = tokio::time::timeout(duration, next.call(request)).await {
                    result
                } else {
                    let timeout_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                    tracing::warn!(timeout_ms, "handler timed out");
                    Err(HandlerError::timeout(duration))
                }
            }
        })
    }
}
