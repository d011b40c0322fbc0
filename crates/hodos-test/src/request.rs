//! Test request building.

use bytes::Bytes;
use hodos_core::{Body, Request};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;

use crate::error::TestError;

/// Builder for constructing test requests.
///
/// Invalid headers or bodies do not panic here; the first error is kept and
/// reported by [`TestRequestBuilder::build`].
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Sets a header, replacing any previous value.
    ///
    /// ```
    /// use hodos_test::TestRequestBuilder;
    /// use http::Method;
    ///
    /// let request = TestRequestBuilder::new(Method::GET, "/users")
    ///     .header("x-request-id", "12345")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.headers()["x-request-id"], "12345");
    /// ```
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = match HeaderName::try_from(name.as_ref()) {
            Ok(name) => name,
            Err(e) => return self.fail(TestError::InvalidHeader(e.to_string())),
        };
        let value = match HeaderValue::try_from(value.as_ref()) {
            Ok(value) => value,
            Err(e) => return self.fail(TestError::InvalidHeader(e.to_string())),
        };
        self.headers.insert(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request body as JSON and the matching Content-Type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Bytes::from(bytes);
                self.content_type("application/json")
            }
            Err(e) => self.fail(TestError::Json(e)),
        }
    }

    /// Builds the request.
    pub fn build(self) -> Result<Request, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut request = http::Request::builder()
            .method(self.method)
            .uri(self.uri.as_str())
            .body(Body::new(self.body))
            .map_err(|e| TestError::RequestBuild(format!("invalid request `{}`: {e}", self.uri)))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }

    fn fail(mut self, err: TestError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_builder_basic() {
        let request = TestRequestBuilder::new(Method::DELETE, "/users/1?hard=true")
            .build()
            .unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.uri().path(), "/users/1");
        assert_eq!(request.uri().query(), Some("hard=true"));
    }

    #[tokio::test]
    async fn test_json_body() {
        let request = TestRequestBuilder::new(Method::POST, "/users")
            .json(&serde_json::json!({"name": "Ada"}))
            .build()
            .unwrap();

        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"name":"Ada"}"#);
    }

    #[test]
    fn test_invalid_header_is_deferred() {
        let err = TestRequestBuilder::new(Method::GET, "/")
            .header("bad header", "x")
            .header("x-ok", "fine")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_uri() {
        let err = TestRequestBuilder::new(Method::GET, "http://[::1")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }
}
