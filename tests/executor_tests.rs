// Request executor behavior against live local servers

mod common;

use common::{client_for, client_with_store, Reply, ScriptedServer, TEST_BACKOFF_MS};
use kale_pool_client::credentials::MemoryCredentialStore;
use kale_pool_client::{ApiError, RequestOptions, RetryPolicy};
use mockito::Matcher;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

async fn get_value(client: &kale_pool_client::ApiClient, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
    client.request::<Value, ()>(Method::GET, path, None, options).await
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/farmers/current")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "Not Found", "message": "Farmer not found", "code": "NOT_FOUND"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.current_farmer().await.unwrap_err();

    assert_eq!(err.status, 404);
    assert_eq!(err.code, "NOT_FOUND");
    assert_eq!(err.message, "Farmer not found");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(500)
        .with_body(r#"{"message": "database unavailable", "code": "DB_DOWN", "details": {"retryIn": 5}}"#)
        .expect(4)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.health().await.unwrap_err();

    assert_eq!(err.status, 500);
    assert_eq!(err.code, "DB_DOWN");
    assert_eq!(err.message, "database unavailable");
    assert_eq!(err.details, Some(json!({"retryIn": 5})));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retries_override_per_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/flaky")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = get_value(&client, "/flaky", RequestOptions::new().retries(1))
        .await
        .unwrap_err();

    assert_eq!(err.status, 503);
    assert_eq!(err.code, "HTTP_ERROR");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_backoff_doubles_between_attempts() {
    let server = ScriptedServer::start(vec![Reply::Status(503, "")]).await;
    let client = client_for(&server.url);

    let started = Instant::now();
    let err = get_value(&client, "/health", RequestOptions::default())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.status, 503);
    assert_eq!(server.hits(), 4);
    // 20 + 40 + 80 ms of sleeping before the three retries
    let minimum = Duration::from_millis(TEST_BACKOFF_MS * (1 + 2 + 4));
    assert!(elapsed >= minimum, "finished after {:?}, expected at least {:?}", elapsed, minimum);
    assert!(elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn test_timeout_is_terminal() {
    let server = ScriptedServer::start(vec![Reply::Hang]).await;
    let client = client_for(&server.url);

    let started = Instant::now();
    let err = get_value(
        &client,
        "/slow",
        RequestOptions::new().timeout(Duration::from_millis(100)),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status, 408);
    assert_eq!(err.code, "TIMEOUT");
    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_html_error_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Bad Gateway</body></html>")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = get_value(&client, "/health", RequestOptions::new().retries(0))
        .await
        .unwrap_err();

    assert_eq!(err.status, 502);
    assert_eq!(err.code, "HTTP_ERROR");
    assert_eq!(err.message, "HTTP 502: Bad Gateway");
    assert_eq!(err.details, None);
}

#[tokio::test]
async fn test_network_error_is_retried() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(&url);
    let err = get_value(&client, "/health", RequestOptions::new().retries(1))
        .await
        .unwrap_err();

    assert_eq!(err.status, 0);
    assert_eq!(err.code, "NETWORK_ERROR");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/wallet/my-balance")
        .match_header("authorization", "Bearer tok-123")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"balance": "12.5"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_with_store(&server.url(), Arc::new(MemoryCredentialStore::with_token("tok-123")));
    let balance = client.my_wallet_balance().await.unwrap();

    assert_eq!(balance, json!({"balance": "12.5"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_skip_auth_omits_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/public")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let client = client_with_store(&server.url(), Arc::new(MemoryCredentialStore::with_token("tok-123")));
    get_value(&client, "/public", RequestOptions::new().skip_auth())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_token_no_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"foo": "bar"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let value = get_value(&client, "/health", RequestOptions::default()).await.unwrap();

    assert_eq!(value, json!({"foo": "bar"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let server = ScriptedServer::start(vec![
        Reply::Status(503, ""),
        Reply::Status(503, r#"{"error": "Service Unavailable", "message": "warming up"}"#),
        Reply::Status(200, r#"{"ok": true}"#),
    ])
    .await;
    let client = client_for(&server.url);

    let started = Instant::now();
    let options = RequestOptions::new()
        .retries(2)
        .timeout(Duration::from_millis(500));
    let value = tokio_test::assert_ok!(get_value(&client, "/health", options).await);

    assert_eq!(value, json!({"ok": true}));
    assert_eq!(server.hits(), 3);
    assert!(started.elapsed() >= Duration::from_millis(TEST_BACKOFF_MS * (1 + 2)));
}

#[tokio::test]
async fn test_passthrough_of_unknown_shape() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/anything")
        .with_status(200)
        .with_body(r#"{"foo": "bar"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let value = tokio_test::assert_ok!(get_value(&client, "/anything", RequestOptions::default()).await);
    assert_eq!(value, json!({"foo": "bar"}));
}

#[tokio::test]
async fn test_undecodable_success_exhausts_retries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body("definitely not json")
        .expect(4)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.health().await.unwrap_err();

    assert_eq!(err.status, 200);
    assert_eq!(err.code, "INVALID_RESPONSE");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_splash_page_then_json_recovers() {
    let server = ScriptedServer::start(vec![
        Reply::Status(200, "<html>proxy splash</html>"),
        Reply::Status(200, r#"{"ok": true}"#),
    ])
    .await;
    let client = client_for(&server.url);

    let value = tokio_test::assert_ok!(get_value(&client, "/health", RequestOptions::default()).await);

    assert_eq!(value, json!({"ok": true}));
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_long_attempt_timeout_is_not_capped() {
    let server = ScriptedServer::start(vec![Reply::Hang]).await;
    let client = client_for(&server.url);

    let started = Instant::now();
    let err = get_value(
        &client,
        "/slow",
        RequestOptions::new().timeout(Duration::from_millis(1_500)).retries(0),
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, "TIMEOUT");
    assert!(started.elapsed() >= Duration::from_millis(1_500));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/harvest/start")
        .with_status(204)
        .create_async()
        .await;

    let client = client_for(&server.url());
    assert_eq!(client.start_harvest_service().await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/check-funding")
        .match_body(Matcher::Json(json!({"userId": "u-1"})))
        .with_status(200)
        .with_body(r#"{"userId": "u-1", "funded": true, "balance": 10.0, "minimumRequired": 5.0, "timestamp": "2026-01-01T00:00:00Z"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let response = client
        .check_funding(&kale_pool_client::models::CheckFundingRequest {
            user_id: "u-1".to_string(),
        })
        .await
        .unwrap();

    assert!(response.funded);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_dropping_request_cancels_pending_retries() {
    let server = ScriptedServer::start(vec![Reply::Status(503, "")]).await;
    let client = client_for(&server.url).with_retry_policy(RetryPolicy::new(3, Duration::from_millis(500)));

    let pending = get_value(&client, "/health", RequestOptions::default());
    assert!(tokio::time::timeout(Duration::from_millis(200), pending).await.is_err());

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_pooler_status_uses_pooler_service_without_auth() {
    let mut backend = mockito::Server::new_async().await;
    let mut pooler = mockito::Server::new_async().await;

    let backend_mock = backend
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let pooler_mock = pooler
        .mock("GET", "/pooler/status")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(
            r#"{
                "poolerId": "p-1",
                "connections": {"farmers": 3, "active": 2, "inactive": 1},
                "lastNotification": {"blockIndex": 42, "timestamp": "2026-01-01T00:00:00Z", "acknowledged": true},
                "blocksDiscovered": {"total": 10, "last24h": 4, "pending": 0},
                "performance": {"uptime": 99.5, "avgResponseTime": 120.0, "successRate": 98.0}
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let mut config = common::test_config(&backend.url());
    config.pooler_base_url = format!("{}/", pooler.url());
    let client = kale_pool_client::ApiClient::new(&config, Arc::new(MemoryCredentialStore::with_token("tok"))).unwrap();

    let status = client.pooler_status().await.unwrap();
    assert_eq!(status.pooler_id, "p-1");
    assert_eq!(status.blocks_discovered.last24h, 4);

    pooler_mock.assert_async().await;
    backend_mock.assert_async().await;
}

#[tokio::test]
async fn test_poolers_page_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/poolers?page=2&limit=5")
        .with_status(200)
        .with_body(r#"{"items": [], "page": 2, "limit": 5, "total": 11}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let filters = kale_pool_client::models::FilterParams {
        page: Some(2),
        limit: Some(5),
        ..Default::default()
    };
    let page = client.poolers(None, &filters).await.unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 11);
    assert_eq!(page.pagination.total_pages, 3);
}

#[tokio::test]
async fn test_poolers_omits_zero_and_empty_filters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/poolers")
        .match_query(Matcher::Exact("limit=5".to_string()))
        .with_status(200)
        .with_body(r#"{"items": [], "total": 0}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let filters = kale_pool_client::models::FilterParams {
        page: Some(0),
        limit: Some(5),
        search: Some(String::new()),
        ..Default::default()
    };
    let page = client.poolers(Some(""), &filters).await.unwrap();

    mock.assert_async().await;
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_health_with_unfamiliar_fields_decodes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status": "maintenance", "version": "2.0.0", "region": "eu-west"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let health = client.health().await.unwrap();

    assert_eq!(
        health.status,
        Some(kale_pool_client::models::HealthStatus::Other("maintenance".to_string()))
    );
    assert_eq!(health.version, "2.0.0");
    mock.assert_async().await;
}
