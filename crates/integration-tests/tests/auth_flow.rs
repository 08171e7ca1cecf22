//! Integration tests for registration, login, and token rotation.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p tiffinbox-server)
//!
//! Run with: cargo test -p tiffinbox-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("TIFFINBOX_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a throwaway customer and return (identifier, password).
async fn register_customer(client: &Client) -> (String, String) {
    let tag = Uuid::new_v4().simple().to_string();
    let email = format!("cust-{tag}@test.example");
    let password = "a-long-enough-password".to_string();

    let resp = client
        .post(format!("{}/users/register", base_url()))
        .json(&json!({
            "username": format!("cust-{tag}"),
            "email": email,
            "phone_number": format!("9{}", &tag[..9]),
            "password": password,
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    (email, password)
}

/// Login and return (`access_token`, `refresh_token`).
async fn login(client: &Client, identifier: &str, password: &str) -> (String, String) {
    let resp = client
        .post(format!("{}/users/login", base_url()))
        .json(&json!({ "identifier": identifier, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("login body not JSON");
    (
        body["access_token"].as_str().expect("no access_token").to_string(),
        body["refresh_token"].as_str().expect("no refresh_token").to_string(),
    )
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_register_login_me_roundtrip() {
    let client = client();
    let (email, password) = register_customer(&client).await;
    let (access, _refresh) = login(&client, &email, &password).await;

    let resp = client
        .get(format!("{}/users/me", base_url()))
        .bearer_auth(&access)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("me body not JSON");
    assert_eq!(body["user"]["email"].as_str(), Some(email.as_str()));
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let (email, password) = register_customer(&client).await;

    let resp = client
        .post(format!("{}/users/register", base_url()))
        .json(&json!({
            "username": "someone-else",
            "email": email,
            "phone_number": "9000000001",
            "password": password,
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_wrong_password_is_unauthorized() {
    let client = client();
    let (email, _password) = register_customer(&client).await;

    let resp = client
        .post(format!("{}/users/login", base_url()))
        .json(&json!({ "identifier": email, "password": "definitely-wrong-pw" }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_refresh_rotation_rejects_replay() {
    let client = client();
    let (email, password) = register_customer(&client).await;
    let (_access, refresh) = login(&client, &email, &password).await;

    // First redemption succeeds and rotates.
    let resp = client
        .post(format!("{}/users/refresh", base_url()))
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("refresh body not JSON");
    let rotated = body["refresh_token"].as_str().expect("no refresh_token");
    assert_ne!(rotated, refresh);

    // Replaying the redeemed token fails on every later attempt.
    for _ in 0..2 {
        let resp = client
            .post(format!("{}/users/refresh", base_url()))
            .json(&json!({ "refresh_token": refresh }))
            .send()
            .await
            .expect("refresh request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    // The rotated token is still good exactly once.
    let resp = client
        .post(format!("{}/users/refresh", base_url()))
        .json(&json!({ "refresh_token": rotated }))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_logout_invalidates_refresh_token() {
    let client = client();
    let (email, password) = register_customer(&client).await;
    let (access, refresh) = login(&client, &email, &password).await;

    let resp = client
        .post(format!("{}/users/logout", base_url()))
        .bearer_auth(&access)
        .send()
        .await
        .expect("logout request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{}/users/refresh", base_url()))
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_customer_token_rejected_on_owner_route() {
    let client = client();
    let (email, password) = register_customer(&client).await;
    let (access, _refresh) = login(&client, &email, &password).await;

    // The credential is valid, the kind is wrong: 403, not 401.
    let resp = client
        .get(format!("{}/owners/profile", base_url()))
        .bearer_auth(&access)
        .send()
        .await
        .expect("profile request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server and migrated database"]
async fn test_owner_registration_gate() {
    let client = client();

    // Any email other than the allow-listed one is rejected with 403.
    let resp = client
        .post(format!("{}/owners/register", base_url()))
        .json(&json!({
            "name": "Not The Owner",
            "email": format!("nobody-{}@test.example", Uuid::new_v4().simple()),
            "password": "a-long-enough-password",
        }))
        .send()
        .await
        .expect("owner register request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
