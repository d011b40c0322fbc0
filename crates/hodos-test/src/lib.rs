//! # Hodos Test
//!
//! In-memory testing for Hodos routers. Requests are dispatched straight
//! into a [`Router`](hodos_server::Router) without binding a port, through
//! the same resolution, middleware and 404/405 handling the server applies.
//!
//! ## Example
//!
//! ```
//! use hodos_core::{Request, RequestExt, Response, ResponseExt};
//! use hodos_server::Router;
//! use hodos_test::TestClient;
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let mut router = Router::new();
//! let key = router.params_key();
//! router
//!     .get("/users/{id}", move |req: Request| async move {
//!         let id = req.param(key, "id").unwrap_or_default().to_string();
//!         Ok(Response::text(StatusCode::OK, id))
//!     })
//!     .unwrap();
//!
//! let client = TestClient::new(router);
//!
//! client
//!     .get("/users/7")
//!     .send()
//!     .await
//!     .assert_status(StatusCode::OK)
//!     .assert_text("7");
//!
//! client
//!     .post("/users/7")
//!     .send()
//!     .await
//!     .assert_status(StatusCode::METHOD_NOT_ALLOWED)
//!     .assert_header("allow", "GET");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hodos-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
