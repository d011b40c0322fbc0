//! Request ID middleware.
//!
//! Assigns every request a [`RequestId`], stores it in the request
//! extensions for downstream stages and handlers, and echoes it back in the
//! `x-request-id` response header.
//!
//! ## Request ID Sources
//!
//! 1. **`x-request-id` header**: used only when the middleware trusts
//!    incoming IDs and the header holds a valid UUID
//! 2. **Generated UUID v7**: otherwise
//!
//! UUID v7 is time-ordered, so IDs sort by arrival in logs.

use std::fmt;

use hodos_core::{Handler, Request};
use http::HeaderValue;
use uuid::Uuid;

use crate::middleware::Middleware;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Unique identifier of one request, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new time-ordered ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware that generates or propagates request IDs.
///
/// # Example
///
/// ```
/// use hodos_middleware::stages::RequestIdMiddleware;
///
/// // External traffic: always mint a fresh ID.
/// let edge = RequestIdMiddleware::new();
///
/// // Internal traffic: keep the caller's ID.
/// let internal = RequestIdMiddleware::trust_incoming();
/// # let _ = (edge, internal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that ignores incoming request IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses valid incoming `x-request-id` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract(trust_incoming: bool, request: &Request) -> Option<RequestId> {
        if !trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn wrap(&self, next: Handler) -> Handler {
        let trust_incoming = self.trust_incoming;

        Handler::new(move |mut request: Request| {
            let next = next.clone();
            async move {
                let request_id =
                    Self::extract(trust_incoming, &request).unwrap_or_else(RequestId::new);
                request.extensions_mut().insert(request_id);

                let mut response = next.call(request).await?;
                if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(response)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hodos_core::{Body, Response, ResponseExt};
    use http::StatusCode;

    fn request_with_id(id: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/test");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::default()).unwrap()
    }

    /// Echoes the extension ID in a body so tests can compare it.
    fn echo_handler() -> Handler {
        Handler::new(|req: Request| async move {
            let id = req
                .extensions()
                .get::<RequestId>()
                .map(ToString::to_string)
                .unwrap_or_default();
            Ok(Response::text(StatusCode::OK, id))
        })
    }

    fn header(response: &hodos_core::Response) -> &str {
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id_when_missing() {
        let handler = RequestIdMiddleware::new().wrap(echo_handler());
        let response = handler.call(request_with_id(None)).await.unwrap();

        let id = header(&response);
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_ignores_incoming_id_when_not_trusted() {
        let incoming = "01890a5d-ac96-774b-bcce-b302099a8057";
        let handler = RequestIdMiddleware::new().wrap(echo_handler());
        let response = handler.call(request_with_id(Some(incoming))).await.unwrap();

        assert_ne!(header(&response), incoming);
    }

    #[tokio::test]
    async fn test_uses_incoming_id_when_trusted() {
        let incoming = "01890a5d-ac96-774b-bcce-b302099a8057";
        let handler = RequestIdMiddleware::trust_incoming().wrap(echo_handler());
        let response = handler.call(request_with_id(Some(incoming))).await.unwrap();

        assert_eq!(header(&response), incoming);
    }

    #[tokio::test]
    async fn test_invalid_incoming_id_is_replaced() {
        let handler = RequestIdMiddleware::trust_incoming().wrap(echo_handler());
        let response = handler
            .call(request_with_id(Some("not-a-uuid")))
            .await
            .unwrap();

        assert_ne!(header(&response), "not-a-uuid");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }
}
