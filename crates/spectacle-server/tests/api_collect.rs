//! Router tests for `POST /collect` and `GET /health`.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use futures_util::future::BoxFuture;
use serde_json::{json, Map, Value};
use spectacle_db::{open_log_store, DbPool, DbRuntimeSettings};
use spectacle_forwarder::{
    Forwarder, HttpTransport, OutboundRequest, OutboundResponse, TransportError,
};
use spectacle_observe::{ConsoleSink, Logger, SqliteWarehouse};
use spectacle_server::{api::CollectResponse, app, config::TagDefaults, AppState};
use spectacle_types::{ContainerVersion, SystemClock};
use tower::ServiceExt; // for oneshot

struct StubTransport {
    status: Option<u16>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl HttpTransport for StubTransport {
    fn post(
        &self,
        request: OutboundRequest,
    ) -> BoxFuture<'_, Result<OutboundResponse, TransportError>> {
        self.requests.lock().unwrap().push(request);
        let status = self.status;
        Box::pin(async move {
            match status {
                Some(status) => Ok(OutboundResponse {
                    status,
                    headers: Map::new(),
                    body: String::new(),
                }),
                None => Err(TransportError::Network("connection reset".to_string())),
            }
        })
    }
}

struct TestApp {
    router: Router,
    transport: Arc<StubTransport>,
    pool: DbPool,
}

fn test_app(status: Option<u16>) -> TestApp {
    let pool = open_log_store(
        ":memory:",
        DbRuntimeSettings {
            pool_max_size: 1,
            ..DbRuntimeSettings::default()
        },
    )
    .unwrap();

    let transport = Arc::new(StubTransport {
        status,
        requests: Mutex::new(Vec::new()),
    });
    let logger = Logger::new(Arc::new(ConsoleSink), Arc::new(SystemClock))
        .with_warehouse(Arc::new(SqliteWarehouse::new(pool.clone())));
    let state = AppState {
        forwarder: Forwarder::new(transport.clone(), logger),
        tag_defaults: TagDefaults {
            workspace_id: Some("ws_default".to_string()),
            base_url: Some("https://collect.example.com".to_string()),
            cookie_domain: None,
            request_timeout_ms: None,
        },
        container: ContainerVersion::default(),
    };

    TestApp {
        router: app(state),
        transport,
        pool,
    }
}

fn collect(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/collect")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64)")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> CollectResponse {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn page_call_is_delivered_and_sets_anonymous_cookie() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(collect(json!({
            "tag": { "methodType": "page" },
            "event": { "page_location": "https://www.example.com/pricing", "page_title": "Pricing" }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    let anon = Cookie::parse_encoded(cookies[0].clone()).unwrap();
    assert_eq!(anon.name(), "sp__anon_id");
    assert_eq!(anon.domain(), Some("example.com"));
    assert_eq!(anon.path(), Some("/"));
    assert_eq!(anon.max_age(), Some(time::Duration::days(365)));
    assert_eq!(anon.secure(), Some(true));
    assert_eq!(anon.same_site(), Some(SameSite::Lax));

    let body = read_body(response).await;
    assert_eq!(body.outcome, "delivered");
    assert_eq!(body.status, Some(200));

    let requests = app.transport.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://collect.example.com/p");
    assert_eq!(
        requests[0].header("user-agent"),
        Some("Mozilla/5.0 (X11; Linux x86_64)")
    );
    let payload: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(payload["writeKey"], "ws_default");
    assert_eq!(payload["properties"]["path"], "/pricing");
}

#[tokio::test]
async fn existing_cookie_is_reused() {
    let app = test_app(Some(200));
    let mut request = collect(json!({ "tag": { "methodType": "page" }, "event": {} }));
    request.headers_mut().insert(
        header::COOKIE,
        "sp__anon_id=12345678-1234-1234-1234-123456789012; sp__user_id=u-9"
            .parse()
            .unwrap(),
    );

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let anon = Cookie::parse_encoded(set_cookies(&response)[0].clone()).unwrap();
    assert_eq!(anon.value(), "12345678-1234-1234-1234-123456789012");

    let requests = app.transport.requests.lock().unwrap().clone();
    let payload: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(payload["anonymousId"], "12345678-1234-1234-1234-123456789012");
    assert_eq!(payload["userId"], "u-9");
}

#[tokio::test]
async fn identify_sets_user_cookie() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(collect(json!({
            "tag": { "methodType": "identify", "userId": "ada@example.com", "cookieDomain": "example.com" },
            "event": {}
        })))
        .await
        .unwrap();

    let cookies: Vec<Cookie<'static>> = set_cookies(&response)
        .into_iter()
        .map(|c| Cookie::parse_encoded(c).unwrap())
        .collect();
    assert_eq!(cookies.len(), 2);
    let user = cookies
        .iter()
        .find(|c| c.name() == "sp__user_id")
        .expect("user id cookie should be set");
    assert_eq!(user.value(), "ada@example.com");
    assert_eq!(user.domain(), Some("example.com"));
}

#[tokio::test]
async fn consent_denied_is_ok_without_request() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(collect(json!({
            "tag": { "methodType": "track", "adStorageConsent": "required" },
            "event": { "event_name": "purchase", "x-ga-gcs": "G100" }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    let body = read_body(response).await;
    assert_eq!(body.outcome, "skipped");
    assert_eq!(body.reason.as_deref(), Some("consent_not_granted"));
    assert!(app.transport.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invocation_errors_are_bad_requests() {
    for (tag, error) in [
        (json!({ "methodType": "track" }), "no event name provided for track call"),
        (json!({ "methodType": "group" }), "no group id provided for group call"),
        (json!({ "methodType": "alias" }), "unknown method type: alias"),
    ] {
        let app = test_app(Some(200));
        let response = app
            .router
            .oneshot(collect(json!({ "tag": tag, "event": {} })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_body(response).await;
        assert_eq!(body.outcome, "failed");
        assert_eq!(body.error.as_deref(), Some(error));
        assert!(app.transport.requests.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn upstream_failures_are_bad_gateway() {
    for status in [Some(500), None] {
        let app = test_app(status);
        let response = app
            .router
            .oneshot(collect(json!({
                "tag": { "methodType": "track", "eventName": "purchase" },
                "event": {}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY, "{status:?}");
    }
}

#[tokio::test]
async fn optimistic_upstream_failure_is_ok() {
    let app = test_app(Some(500));

    let response = app
        .router
        .oneshot(collect(json!({
            "tag": { "methodType": "track", "eventName": "purchase", "optimisticScenario": true },
            "event": {}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await.outcome, "dispatched");
}

#[tokio::test]
async fn warehouse_logging_writes_rows() {
    let app = test_app(Some(200));
    let mut request = collect(json!({
        "tag": {
            "methodType": "track",
            "eventName": "purchase",
            "logType": "no",
            "bigQueryLogType": "always",
            "logBigQueryProjectId": "proj",
            "logBigQueryDatasetId": "tags",
            "logBigQueryTableId": "spectacle"
        },
        "event": {}
    }));
    request
        .headers_mut()
        .insert("trace-id", "trace-77".parse().unwrap());

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let conn = app.pool.get().unwrap();
    let mut stmt = conn
        .prepare("SELECT type, trace_id, table_id, request_url FROM tag_logs ORDER BY id")
        .unwrap();
    let rows: Vec<(String, String, String, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "Request");
    assert_eq!(rows[0].1, "trace-77");
    assert_eq!(rows[0].2, "spectacle");
    assert_eq!(
        rows[0].3.as_deref(),
        Some("https://collect.example.com/t")
    );
    assert_eq!(rows[1].0, "Response");
    assert_eq!(rows[1].3, None);
}

#[tokio::test]
async fn preview_and_unrecognised_log_policies_are_accepted() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(collect(json!({
            "tag": {
                "methodType": "page",
                "logType": "preview",
                "bigQueryLogType": "sometimes"
            },
            "event": {}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await.outcome, "delivered");

    let conn = app.pool.get().unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM tag_logs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0, "an unrecognised warehouse policy never writes");
}

#[tokio::test]
async fn cookie_domain_stops_at_public_suffix() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(collect(json!({
            "tag": { "methodType": "page" },
            "event": { "page_location": "https://alice.github.io/blog" }
        })))
        .await
        .unwrap();

    let anon = Cookie::parse_encoded(set_cookies(&response)[0].clone()).unwrap();
    assert_eq!(anon.domain(), Some("alice.github.io"));
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = test_app(Some(200));

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/collect")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(app.transport.requests.lock().unwrap().is_empty());
}
