//! Request and response types shared by every Hodos crate.
//!
//! Bodies are fully buffered: the transport collects the incoming body into
//! [`Body`] before dispatch, so handlers and middleware never deal with
//! streaming.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

/// The buffered HTTP body.
pub type Body = Full<Bytes>;

/// The HTTP request type seen by handlers and middleware.
pub type Request = http::Request<Body>;

/// The HTTP response type produced by handlers and middleware.
pub type Response = http::Response<Body>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Shorthand constructors for common responses.
pub trait ResponseExt {
    /// A response with the given status and an empty body.
    fn empty(status: StatusCode) -> Response;

    /// A `text/plain` response.
    fn text(status: StatusCode, body: impl Into<String>) -> Response;

    /// An `application/json` response serialising `value`.
    ///
    /// Falls back to a 500 error envelope if `value` fails to serialise.
    fn json<T: Serialize>(status: StatusCode, value: &T) -> Response;

    /// A plain-text error response.
    fn error(status: StatusCode, message: &str) -> Response;

    /// A JSON error envelope: `{"error":{"code":..,"message":..}}`.
    fn json_error(status: StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn text(status: StatusCode, body: impl Into<String>) -> Response {
        with_content_type(status, TEXT_PLAIN, Bytes::from(body.into()))
    }

    fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => with_content_type(status, APPLICATION_JSON, Bytes::from(body)),
            Err(e) => Self::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_ERROR",
                &format!("failed to serialize response: {e}"),
            ),
        }
    }

    fn error(status: StatusCode, message: &str) -> Response {
        Self::text(status, message)
    }

    fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        with_content_type(status, APPLICATION_JSON, Bytes::from(body.to_string()))
    }
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
