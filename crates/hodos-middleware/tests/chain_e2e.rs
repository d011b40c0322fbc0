//! End-to-end tests composing the built-in stages into one chain.

use std::sync::Arc;
use std::time::Duration;

use hodos_core::{Body, Handler, HandlerError, Request, Response, ResponseExt};
use hodos_middleware::stages::{
    LoggingMiddleware, RecoveryMiddleware, RequestId, RequestIdMiddleware, TimeoutMiddleware,
    REQUEST_ID_HEADER,
};
use hodos_middleware::{from_fn, BoxedMiddleware, Chain, Next};
use http::StatusCode;
use http_body_util::BodyExt;

fn standard_chain() -> Chain {
    let stages: Vec<BoxedMiddleware> = vec![
        Arc::new(RequestIdMiddleware::new()),
        Arc::new(LoggingMiddleware::new("e2e")),
        Arc::new(RecoveryMiddleware::new()),
        Arc::new(TimeoutMiddleware::new(Duration::from_secs(1))),
    ];
    Chain::build(&stages)
}

fn request(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(Body::default())
        .unwrap()
}

#[tokio::test]
async fn test_stage_names_in_order() {
    assert_eq!(
        standard_chain().stage_names(),
        vec!["request_id", "logging", "recovery", "timeout"]
    );
}

#[tokio::test]
async fn test_handler_sees_request_id() {
    let handler = standard_chain().then(Handler::new(|req: Request| async move {
        let id = req.extensions().get::<RequestId>().map(ToString::to_string);
        Ok(Response::text(StatusCode::OK, id.unwrap_or_default()))
    }));

    let response = handler.call(request("/")).await.unwrap();
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(body, header.as_bytes());
}

#[tokio::test]
async fn test_panic_inside_full_chain() {
    let handler = standard_chain().then(Handler::new(|_req: Request| async {
        if true {
            panic!("exploded");
        }
        Ok(Response::empty(StatusCode::OK))
    }));

    let err = handler.call(request("/")).await.unwrap_err();
    assert_eq!(err.code(), "HANDLER_PANIC");
    assert_eq!(err.to_envelope().error.message, "internal server error");
}

#[tokio::test]
async fn test_short_circuit_skips_inner_stages() {
    let guard = from_fn("guard", |req: Request, next: Next| async move {
        if req.headers().contains_key("authorization") {
            next.run(req).await
        } else {
            Err(HandlerError::status(StatusCode::UNAUTHORIZED, "login required"))
        }
    });
    let chain = Chain::build(&[guard]).extend(standard_chain().middlewares());
    let handler = chain.then(Handler::new(|_req: Request| async {
        Ok(Response::empty(StatusCode::OK))
    }));

    let err = handler.call(request("/admin")).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

    let authorized = http::Request::builder()
        .uri("/admin")
        .header("authorization", "Bearer t")
        .body(Body::default())
        .unwrap();
    let response = handler.call(authorized).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}
