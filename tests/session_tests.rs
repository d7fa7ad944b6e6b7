// Login, logout and stored-profile flows

mod common;

use common::{client_for, client_with_store};
use kale_pool_client::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials, UserProfile};
use kale_pool_client::models::TimeWindow;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

const ME_FARMER: &str = r#"{
    "user": {
        "id": "u-1",
        "email": "farmer@example.com",
        "role": "FARMER",
        "farmerId": "f-1",
        "status": "active"
    }
}"#;

#[tokio::test]
async fn test_login_stores_token_and_profile() {
    let mut server = mockito::Server::new_async().await;
    let login = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(json!({"email": "farmer@example.com", "password": "hunter2"})))
        .with_status(200)
        .with_body(r#"{"token": "tok-1", "user": {"id": "u-1"}}"#)
        .expect(1)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/auth/me")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_body(ME_FARMER)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    client.login("farmer@example.com", "hunter2").await.unwrap();

    assert_eq!(client.stored_token().as_deref(), Some("tok-1"));
    let profile = client.stored_profile().unwrap();
    assert_eq!(profile.farmer_id.as_deref(), Some("f-1"));
    assert_eq!(profile.role.as_deref(), Some("farmer"));
    login.assert_async().await;
    me.assert_async().await;
}

#[tokio::test]
async fn test_login_survives_failed_profile_probe() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(r#"{"token": "tok-1"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/auth/me")
        .with_status(403)
        .create_async()
        .await;

    let client = client_for(&server.url());
    client.login("farmer@example.com", "hunter2").await.unwrap();

    assert_eq!(client.stored_token().as_deref(), Some("tok-1"));
    assert_eq!(client.stored_profile().unwrap_or_default().farmer_id, None);
}

#[tokio::test]
async fn test_rejected_login_stores_nothing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"error": "Unauthorized", "message": "Invalid credentials", "code": "INVALID_CREDENTIALS"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.login("farmer@example.com", "wrong").await.unwrap_err();

    assert!(err.to_string().contains("Invalid credentials"));
    assert_eq!(client.stored_token(), None);
}

#[tokio::test]
async fn test_stored_farmer_id_fills_in_path() {
    let mut server = mockito::Server::new_async().await;
    let summary = server
        .mock("GET", "/farmers/f-1/summary?window=7d")
        .with_status(200)
        .with_body(r#"{"farmerId": "f-1"}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .store(&StoredCredentials::new("tok").with_user(UserProfile {
            farmer_id: Some("f-1".to_string()),
            role: Some("farmer".to_string()),
            ..Default::default()
        }))
        .unwrap();

    let client = client_with_store(&server.url(), store);
    let value = client.farmer_summary(None, Some(TimeWindow::Week)).await.unwrap();

    assert_eq!(value["farmerId"], "f-1");
    summary.assert_async().await;
}

#[tokio::test]
async fn test_farmer_id_mismatch_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let any = server.mock("GET", Matcher::Any).expect(0).create_async().await;

    let store = Arc::new(MemoryCredentialStore::new());
    store
        .store(&StoredCredentials::new("tok").with_user(UserProfile {
            farmer_id: Some("f-1".to_string()),
            role: Some("farmer".to_string()),
            ..Default::default()
        }))
        .unwrap();

    let client = client_with_store(&server.url(), store);
    let err = client.farmer_summary(Some("f-2"), None).await.unwrap_err();

    assert_eq!(err.status, 403);
    any.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/logout")
        .with_status(401)
        .create_async()
        .await;

    let client = client_with_store(&server.url(), Arc::new(MemoryCredentialStore::with_token("tok")));
    tokio_test::assert_err!(client.logout().await);
    assert_eq!(client.stored_token(), None);
}

#[tokio::test]
async fn test_refresh_user_clears_rejected_token() {
    let mut server = mockito::Server::new_async().await;
    let me = server
        .mock("GET", "/auth/me")
        .with_status(401)
        .with_body(r#"{"error": "Token expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_with_store(&server.url(), Arc::new(MemoryCredentialStore::with_token("stale")));
    assert_eq!(client.refresh_user().await.unwrap(), None);
    assert_eq!(client.stored_token(), None);
    me.assert_async().await;
}

#[tokio::test]
async fn test_refresh_user_keeps_token_on_server_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/auth/me")
        .with_status(503)
        .expect(4)
        .create_async()
        .await;

    let client = client_with_store(&server.url(), Arc::new(MemoryCredentialStore::with_token("tok")));
    tokio_test::assert_err!(client.refresh_user().await);
    assert_eq!(client.stored_token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn test_refresh_user_without_token_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let me = server.mock("GET", "/auth/me").expect(0).create_async().await;

    let client = client_for(&server.url());
    assert_eq!(client.refresh_user().await.unwrap(), None);
    me.assert_async().await;
}

#[tokio::test]
async fn test_register_farmer_persists_token_to_file() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/register-farmer")
        .with_status(201)
        .with_body(r#"{"userId": "u-9", "token": "tok-new"}"#)
        .create_async()
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("credentials.json");

    let client = client_with_store(&server.url(), Arc::new(FileCredentialStore::new(&path)));
    client
        .register_farmer("new@example.com", "pw", "GEXTERNAL")
        .await
        .unwrap();

    // A second client over the same file sees the session
    let reopened = client_with_store(&server.url(), Arc::new(FileCredentialStore::new(&path)));
    assert_eq!(reopened.stored_token().as_deref(), Some("tok-new"));
}
