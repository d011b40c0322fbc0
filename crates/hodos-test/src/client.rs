//! Test client for in-memory dispatch.

use std::sync::Arc;

use bytes::Bytes;
use hodos_core::Handler;
use hodos_server::Router;
use http::Method;
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// Sends requests straight into a router without binding a port.
///
/// Requests go through the same resolution and middleware as the server
/// would apply, but handler errors are rendered with
/// [`HandlerError::into_response`](hodos_core::HandlerError::into_response)
/// unless [`TestClientRequest::try_send`] is used.
///
/// # Example
///
/// ```
/// use hodos_core::{Request, Response, ResponseExt};
/// use hodos_server::Router;
/// use hodos_test::TestClient;
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let mut router = Router::new();
/// router
///     .get("/ping", |_req: Request| async {
///         Ok(Response::text(StatusCode::OK, "pong"))
///     })
///     .unwrap();
///
/// let client = TestClient::new(router);
/// client.get("/ping").send().await.assert_text("pong");
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    handler: Handler,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client that dispatches through `router`.
    pub fn new(router: Router) -> Self {
        Self::from_handler(router.into_handler())
    }

    /// Creates a client over an already shared router.
    pub fn from_shared(router: Arc<Router>) -> Self {
        Self::from_handler(Handler::new(move |request| router.dispatch(request)))
    }

    /// Creates a client over any handler.
    pub fn from_handler(handler: Handler) -> Self {
        Self {
            handler,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a HEAD request.
    pub fn head(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Creates an OPTIONS request.
    pub fn options(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Creates a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request, rendering handler errors as error envelopes.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub async fn send(self) -> TestResponse {
        let request = match self.builder.build() {
            Ok(request) => request,
            Err(e) => panic!("failed to build test request: {e}"),
        };
        let response = match self.client.handler.call(request).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };
        TestResponse::from_response(response).await
    }

    /// Sends the request and returns handler errors unchanged.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        let response = self.client.handler.call(request).await?;
        Ok(TestResponse::from_response(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hodos_core::{HandlerError, Request, RequestExt, Response, ResponseExt};
    use http::StatusCode;
    use http_body_util::BodyExt;

    fn echo_router() -> Router {
        let mut router = Router::new();
        let key = router.params_key();
        router
            .get("/users/{id}", move |req: Request| async move {
                let id = req.param(key, "id").unwrap_or_default().to_string();
                Ok(Response::json(
                    StatusCode::OK,
                    &serde_json::json!({ "id": id }),
                ))
            })
            .unwrap()
            .post("/echo", |req: Request| async move {
                let content_type = req
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                let body = req
                    .into_body()
                    .collect()
                    .await
                    .map(http_body_util::Collected::to_bytes)
                    .unwrap_or_default();
                let mut response = Response::text(StatusCode::OK, String::from_utf8_lossy(&body));
                response
                    .headers_mut()
                    .insert("x-echo-content-type", content_type.parse().unwrap());
                Ok(response)
            })
            .unwrap()
            .get("/custom", |req: Request| async move {
                let value = req
                    .headers()
                    .get("x-custom")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                Ok(Response::text(StatusCode::OK, value))
            })
            .unwrap()
            .get("/teapot", |_req: Request| async {
                Err(HandlerError::status(StatusCode::IM_A_TEAPOT, "short and stout"))
            })
            .unwrap();
        router
    }

    #[tokio::test]
    async fn test_get_with_params() {
        let client = TestClient::new(echo_router());
        let response = client.get("/users/42").send().await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["id"], "42");
    }

    #[tokio::test]
    async fn test_json_body_sets_content_type() {
        let client = TestClient::new(echo_router());
        let response = client
            .post("/echo")
            .json(&serde_json::json!({"name": "Ada"}))
            .send()
            .await;

        response
            .assert_header("x-echo-content-type", "application/json")
            .assert_text(r#"{"name":"Ada"}"#);
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = TestClient::new(echo_router()).with_default_header("x-custom", "default");
        client.get("/custom").send().await.assert_text("default");

        client
            .get("/custom")
            .header("x-custom", "override")
            .send()
            .await
            .assert_text("override");
    }

    #[tokio::test]
    async fn test_handler_error_rendering() {
        let client = TestClient::new(echo_router());

        client
            .get("/teapot")
            .send()
            .await
            .assert_status(StatusCode::IM_A_TEAPOT)
            .assert_error_code("HANDLER_ERROR");

        let err = client.get("/teapot").try_send().await.unwrap_err();
        assert!(matches!(err, TestError::Handler(_)));
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let client = TestClient::from_shared(Arc::new(echo_router()));

        client
            .get("/missing")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND)
            .assert_error_code("NOT_FOUND");

        client
            .delete("/users/1")
            .send()
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED)
            .assert_header("allow", "GET");
    }
}
