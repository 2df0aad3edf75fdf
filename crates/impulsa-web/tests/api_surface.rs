//! Surface tests against a live server on an ephemeral port.
//!
//! The pool is lazy and none of the routes exercised here touch the
//! database, so the suite runs without PostgreSQL.

use std::net::SocketAddr;

use serde_json::Value;

use impulsa_config::Config;
use impulsa_db::Database;
use impulsa_web::router::build_router;
use impulsa_web::state::AppState;

async fn spawn_app(mutate: impl FnOnce(&mut Config)) -> String {
    let mut config = Config::default();
    config.database.run_schema = false;
    mutate(&mut config);

    let db = Database::connect_lazy(&config.database).expect("lazy pool");
    let state = AppState::new(config, db.pool().clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_reports_ok() {
    let base = spawn_app(|_| {}).await;

    let response = reqwest::get(format!("{base}/health")).await.expect("request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_gets_json_404() {
    let base = spawn_app(|_| {}).await;

    let response = reqwest::get(format!("{base}/api/unknown/route"))
        .await
        .expect("request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "Endpoint not found");
    assert_eq!(body["path"], "/api/unknown/route");
}

#[tokio::test]
async fn missing_key_is_401_when_required() {
    let base = spawn_app(|config| {
        config.auth.require_api_key = true;
        config.auth.api_keys = vec!["sesame".to_string()];
    })
    .await;

    let response = reqwest::get(format!("{base}/api")).await.expect("request");
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "API key required");
}

#[tokio::test]
async fn wrong_key_is_403_even_when_optional() {
    let base = spawn_app(|config| {
        config.auth.require_api_key = false;
        config.auth.api_keys = vec!["sesame".to_string()];
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{base}/api"))
        .header("X-API-Key", "wrong")
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 403);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "Invalid API key");
}

#[tokio::test]
async fn key_passes_via_header_or_query() {
    let base = spawn_app(|config| {
        config.auth.require_api_key = true;
        config.auth.api_keys = vec!["sesame".to_string()];
    })
    .await;

    let client = reqwest::Client::new();
    let with_header = client
        .get(format!("{base}/api"))
        .header("X-API-Key", "sesame")
        .send()
        .await
        .expect("request");
    assert_eq!(with_header.status(), 200);

    let with_query = reqwest::get(format!("{base}/api?api_key=sesame"))
        .await
        .expect("request");
    assert_eq!(with_query.status(), 200);

    let body: Value = with_query.json().await.expect("json body");
    assert_eq!(body["name"], "FEMETE IMPULSA API");
}

#[tokio::test]
async fn rate_limit_trips_with_retry_after() {
    let base = spawn_app(|config| {
        config.rate_limit.max_requests = 2;
        config.rate_limit.window_secs = 60;
    })
    .await;

    for _ in 0..2 {
        let ok = reqwest::get(format!("{base}/api")).await.expect("request");
        assert_eq!(ok.status(), 200);
    }

    let limited = reqwest::get(format!("{base}/api")).await.expect("request");
    assert_eq!(limited.status(), 429);
    let retry_after = limited
        .headers()
        .get("retry-after")
        .expect("Retry-After header")
        .to_str()
        .expect("ascii header");
    assert!(retry_after.parse::<u64>().expect("numeric") >= 1);

    let body: Value = limited.json().await.expect("json body");
    assert_eq!(body["error"], "Too many requests");
    assert!(body["message"]
        .as_str()
        .expect("message string")
        .starts_with("Rate limit exceeded"));
}

#[tokio::test]
async fn health_is_not_rate_limited() {
    let base = spawn_app(|config| {
        config.rate_limit.max_requests = 1;
        config.rate_limit.window_secs = 60;
    })
    .await;

    for _ in 0..5 {
        let response = reqwest::get(format!("{base}/health")).await.expect("request");
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
async fn openapi_document_is_served() {
    let base = spawn_app(|_| {}).await;

    let response = reqwest::get(format!("{base}/api/openapi.json"))
        .await
        .expect("request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["info"]["title"], "FEMETE IMPULSA API - STARS 2025");
    assert!(body["paths"]["/api/projects"].is_object());
    assert!(body["paths"]["/api/kpi-stars/dashboard"].is_object());
}

#[tokio::test]
async fn docs_page_is_open() {
    let base = spawn_app(|config| {
        config.auth.require_api_key = true;
        config.auth.api_keys = vec!["sesame".to_string()];
    })
    .await;

    let response = reqwest::get(format!("{base}/api-docs")).await.expect("request");
    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("html body");
    assert!(body.contains("/api/openapi.json"));
}
