//! Whole-application tests through the facade and the in-memory client.

use std::time::Duration;

use hodos::config::ConfigLoader;
use hodos::middleware::stages::REQUEST_ID_HEADER;
use hodos::prelude::*;
use hodos::server::RouteInfo;
use hodos_test::TestClient;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq)]
struct Doc(&'static str);

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
}

fn app() -> Router {
    let mut router = Router::new();
    router.use_middleware(hodos::standard_middleware(Duration::from_millis(100)));
    let key = router.params_key();

    router
        .handle_with_metadata(
            Method::GET,
            "/health",
            |_req: Request| async { Ok(Response::text(StatusCode::OK, "ok")) },
            Doc("liveness probe"),
        )
        .unwrap();

    let api = router.subrouter("/api");
    api.get("/users/{id:[0-9]+}", move |req: Request| async move {
        let id: u64 = req
            .param(key, "id")
            .and_then(|id| id.parse().ok())
            .ok_or_else(|| HandlerError::bad_request("id out of range"))?;
        Ok(Response::json(
            StatusCode::OK,
            &User {
                id,
                name: format!("user-{id}"),
            },
        ))
    })
    .unwrap();

    api.group("/admin", Vec::<BoxedMiddleware>::new())
        .get("/panic", |_req: Request| async {
            if true {
                panic!("admin exploded");
            }
            Ok(Response::empty(StatusCode::OK))
        })
        .unwrap()
        .get("/slow", |_req: Request| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Response::empty(StatusCode::OK))
        })
        .unwrap();

    api.not_found(|req: Request| async move {
        Ok(Response::json_error(
            StatusCode::NOT_FOUND,
            "API_NOT_FOUND",
            &format!("unknown api path {}", req.uri().path()),
        ))
    });

    router
}

#[tokio::test]
async fn test_health_has_request_id() {
    let client = TestClient::new(app());
    let response = client.get("/health").send().await;

    response.assert_status(StatusCode::OK).assert_text("ok");
    assert!(response.header(REQUEST_ID_HEADER).is_some());
}

#[tokio::test]
async fn test_subrouter_route_with_constraint() {
    let client = TestClient::new(app());

    let response = client.get("/api/users/7").send().await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["id"], 7);
    assert_eq!(body["name"], "user-7");

    client
        .get("/api/users/seven")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("API_NOT_FOUND");
}

#[tokio::test]
async fn test_handler_error_from_question_mark() {
    let client = TestClient::new(app());

    client
        .get("/api/users/99999999999999999999999")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("BAD_REQUEST");
}

#[tokio::test]
async fn test_panic_is_recovered() {
    let client = TestClient::new(app());

    client
        .get("/api/admin/panic")
        .send()
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_code("HANDLER_PANIC");
}

#[tokio::test]
async fn test_slow_handler_times_out() {
    let client = TestClient::new(app());

    client
        .get("/api/admin/slow")
        .send()
        .await
        .assert_status(StatusCode::GATEWAY_TIMEOUT)
        .assert_error_code("HANDLER_TIMEOUT");
}

#[tokio::test]
async fn test_root_fallbacks() {
    let client = TestClient::new(app());

    client
        .get("/nowhere")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("NOT_FOUND");

    client
        .post("/health")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_header("allow", "GET")
        .assert_error_code("METHOD_NOT_ALLOWED");
}

#[test]
fn test_route_listing_with_metadata() {
    let routes: Vec<RouteInfo> = app().routes();
    let listing: Vec<(String, String)> = routes
        .iter()
        .map(|r| (r.method.to_string(), r.pattern.clone()))
        .collect();

    assert_eq!(
        listing,
        [
            ("GET".to_string(), "/health".to_string()),
            ("GET".to_string(), "/api/users/{id:[0-9]+}".to_string()),
            ("GET".to_string(), "/api/admin/panic".to_string()),
            ("GET".to_string(), "/api/admin/slow".to_string()),
        ]
    );
    assert_eq!(
        routes[0].metadata_as::<Doc>(),
        Some(&Doc("liveness probe"))
    );
    assert!(routes[1].metadata.is_none());
}

#[test]
fn test_config_feeds_server_config() {
    let config = ConfigLoader::new()
        .with_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090
            shutdown_timeout_secs = 5
            "#,
            "toml",
        )
        .unwrap()
        .with_env_vars([("HODOS__SERVER__WATCH", "true")])
        .with_env_prefix("HODOS")
        .load()
        .unwrap();

    let server = ServerConfig::from(&config.server);
    assert_eq!(server.http_addr(), "127.0.0.1:9090");
    assert_eq!(server.shutdown_timeout(), Duration::from_secs(5));
    assert!(server.watch());
}
