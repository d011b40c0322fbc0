//! Request logging middleware.
//!
//! Opens a `request` span around the rest of the chain and emits one event
//! when the request completes, carrying the method, path, status and
//! duration. Handler failures are logged at `warn`.

use std::time::Instant;

use hodos_core::{Handler, Request};
use tracing::Instrument;

use super::request_id::RequestId;
use crate::middleware::Middleware;

/// Middleware that logs each request with `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    service_name: &'static str,
}

impl LoggingMiddleware {
    /// Creates a logging middleware labelling events with `service_name`.
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self { service_name }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new("hodos")
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let service = self.service_name;

        Handler::new(move |request: Request| {
            let next = next.clone();
            let method = request.method().clone();
            let path = request.uri().path().to_string();
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(ToString::to_string)
                .unwrap_or_default();

            let span = tracing::info_span!(
                "request",
                service,
                http.method = %method,
                http.path = %path,
                request_id = %request_id,
            );

            async move {
                let start = Instant::now();
                let result = next.call(request).await;
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

                match &result {
                    Ok(response) => tracing::info!(
                        status_code = response.status().as_u16(),
                        duration_ms,
                        "request completed"
                    ),
                    Err(err) => tracing::warn!(
                        status_code = err.status_code().as_u16(),
                        error_code = err.code(),
                        error = %err,
                        duration_ms,
                        "request failed"
                    ),
                }

                result
            }
            .instrument(span)
        })
    }
}
