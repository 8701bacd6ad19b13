//! Integration tests for Basic authentication.

mod common;

use common::{TestHarness, TEST_LOGIN, TEST_PASSWORD};

#[tokio::test]
async fn auth_check_with_valid_credentials() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/check"))
        .basic_auth(TEST_LOGIN, Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["login"], TEST_LOGIN);
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/auth/check"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Authorization required");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/check"))
        .basic_auth(TEST_LOGIN, Some("wrong"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn unparseable_header_is_invalid_credentials() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/check"))
        .header("Authorization", "Basic !!!not-base64!!!")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn unknown_user_is_unauthorized() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/check"))
        .basic_auth("mallory", Some(TEST_PASSWORD))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn oversized_login_is_rejected() {
    let (_h, addr) = TestHarness::with_server().await;

    let login = "x".repeat(64);
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/auth/check"))
        .basic_auth(&login, Some("pw"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn protected_routes_require_auth() {
    let (_h, addr) = TestHarness::with_server().await;

    for path in ["/api/videos", "/api/users/me/history?videoId=x"] {
        let resp = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
        assert_eq!(resp.status(), 401, "expected 401 for {path}");
    }
}

#[tokio::test]
async fn health_needs_no_auth() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}
