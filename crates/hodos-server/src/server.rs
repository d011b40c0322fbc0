//! HTTP server implementation.
//!
//! The server is a thin transport around a frozen [`Router`]:
//!
//! - TCP listener bound to the configured address
//! - one task per connection, served by hyper's HTTP/1.1 implementation
//! - request bodies collected into memory before dispatch
//! - handler errors rendered as JSON error envelopes
//! - graceful shutdown driven by a [`ShutdownSignal`]
//!
//! # Example
//!
//! ```rust,no_run
//! use hodos_core::{Request, Response, ResponseExt};
//! use hodos_server::{Router, Server, ServerConfig};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.get("/ping", |_req: Request| async {
//!         Ok(Response::text(StatusCode::OK, "pong"))
//!     })?;
//!
//!     let config = ServerConfig::new("127.0.0.1:8080");
//!     Server::new(config, router).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use hodos_core::{Request, Response, ResponseExt};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is not `ip:port`.
    #[error("invalid address `{addr}`: {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parser error.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address being bound.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Other I/O error from the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Hodos HTTP server.
pub struct Server {
    config: ServerConfig,
    router: Arc<Router>,
}

impl Server {
    /// Creates a server that will dispatch through `router`.
    ///
    /// The router is frozen from here on.
    #[must_use]
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the shared router.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and runs until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            routes = self.router.routes().len(),
            watch = self.config.watch(),
            "server listening"
        );

        let tracker = ConnectionTracker::new();
        let request_timeout = self.config.request_timeout();

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, remote_addr)) => {
                        let router = Arc::clone(&self.router);
                        let shutdown = shutdown.clone();
                        let token = tracker.acquire();

                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(router, stream, request_timeout, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }
        drop(listener);

        let shutdown_timeout = self.config.shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            active = tracker.active_connections(),
            "waiting for connections to close"
        );

        if tokio::time::timeout(shutdown_timeout, tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    router: Arc<Router>,
    stream: TcpStream,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request: http::Request<Incoming>| {
        let router = Arc::clone(&router);
        async move { Ok::<_, Infallible>(handle_request(&router, request, request_timeout).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => result,
        () = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    }
}

/// Buffers the body, dispatches, and renders handler errors.
async fn handle_request(
    router: &Router,
    request: http::Request<Incoming>,
    request_timeout: Duration,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes: Bytes = match tokio::time::timeout(request_timeout, body.collect()).await {
        Ok(Ok(collected)) => collected.to_bytes(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to read request body");
            return Response::json_error(
                StatusCode::BAD_REQUEST,
                "BODY_READ_ERROR",
                "failed to read request body",
            );
        }
        Err(_) => {
            tracing::warn!(path = %parts.uri.path(), "request body timed out");
            return Response::json_error(
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
                "request body was not received in time",
            );
        }
    };

    let request = Request::from_parts(parts, Full::new(bytes));
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match router.dispatch(request).await {
        Ok(response) => response,
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                tracing::error!(method = %method, path = %path, error = %err, "handler failed");
            } else {
                tracing::debug!(method = %method, path = %path, error = %err, "handler rejected request");
            }
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hodos_core::{HandlerError, RequestExt};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn start(router: Router) -> (SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let config = ServerConfig::default().with_shutdown_timeout(Duration::from_secs(1));
        let server = Server::new(config, router);
        let signal = shutdown.clone();
        let handle = tokio::spawn(async move {
            server.serve(listener, signal).await.unwrap();
        });
        (addr, shutdown, handle)
    }

    async fn send(addr: SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn router() -> Router {
        let mut router = Router::new();
        let key = router.params_key();
        router
            .get("/ping", |_req: Request| async {
                Ok(Response::text(StatusCode::OK, "pong"))
            })
            .unwrap()
            .post("/echo/{name}", move |req: Request| async move {
                let name = req.param(key, "name").unwrap_or_default().to_string();
                let body = req
                    .into_body()
                    .collect()
                    .await
                    .map(http_body_util::Collected::to_bytes)
                    .unwrap_or_default();
                let body = String::from_utf8_lossy(&body).into_owned();
                Ok(Response::text(StatusCode::OK, format!("{name}:{body}")))
            })
            .unwrap()
            .get("/fail", |_req: Request| async {
                Err(HandlerError::internal("secret detail"))
            })
            .unwrap();
        router
    }

    #[tokio::test]
    async fn test_serves_requests() {
        let (addr, shutdown, handle) = start(router()).await;

        let response = send(addr, "GET /ping HTTP/1.1\r\nhost: x\r\nconnection: close\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("pong"));

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_body_and_params_reach_handler() {
        let (addr, shutdown, handle) = start(router()).await;

        let response = send(
            addr,
            "POST /echo/ada HTTP/1.1\r\nhost: x\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
        )
        .await;
        assert!(response.ends_with("ada:hello"));

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_error_is_rendered() {
        let (addr, shutdown, handle) = start(router()).await;

        let response = send(addr, "GET /fail HTTP/1.1\r\nhost: x\r\nconnection: close\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 500"));
        assert!(response.contains("INTERNAL_ERROR"));
        assert!(!response.contains("secret detail"));

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let (addr, shutdown, handle) = start(router()).await;

        let missing = send(addr, "GET /nope HTTP/1.1\r\nhost: x\r\nconnection: close\r\n\r\n").await;
        assert!(missing.starts_with("HTTP/1.1 404"));

        let wrong = send(addr, "DELETE /ping HTTP/1.1\r\nhost: x\r\nconnection: close\r\n\r\n").await;
        assert!(wrong.starts_with("HTTP/1.1 405"));
        assert!(wrong.to_lowercase().contains("allow: get"));

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let config = ServerConfig::new("not-an-addr");
        let err = Server::new(config, Router::new())
            .run_with_shutdown(ShutdownSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }
}
