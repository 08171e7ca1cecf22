//! Integration tests for like toggling.
//!
//! Requires a running server, a migrated database, and a seeded video
//! (`TIFFINBOX_TEST_VIDEO_ID`).
//!
//! Run with: cargo test -p tiffinbox-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

fn base_url() -> String {
    std::env::var("TIFFINBOX_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn test_video_id() -> String {
    std::env::var("TIFFINBOX_TEST_VIDEO_ID")
        .expect("set TIFFINBOX_TEST_VIDEO_ID to a seeded video id")
}

async fn customer_token(client: &Client) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    let email = format!("like-{tag}@test.example");
    let password = "a-long-enough-password";

    let resp = client
        .post(format!("{}/users/register", base_url()))
        .json(&json!({
            "username": format!("like-{tag}"),
            "email": email,
            "phone_number": format!("7{}", &tag[..9]),
            "password": password,
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/users/login", base_url()))
        .json(&json!({ "identifier": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    let body: Value = resp.json().await.expect("login body not JSON");
    body["access_token"].as_str().expect("no access_token").to_string()
}

/// Login the allow-listed owner account, registering it on first use.
async fn owner_token(client: &Client) -> String {
    let email = std::env::var("TIFFINBOX_OWNER_EMAIL")
        .expect("set TIFFINBOX_OWNER_EMAIL to the server's allow-listed owner email");
    let password = std::env::var("TIFFINBOX_OWNER_PASSWORD")
        .expect("set TIFFINBOX_OWNER_PASSWORD for the allow-listed owner");

    let resp = client
        .post(format!("{}/owners/register", base_url()))
        .json(&json!({ "name": "Test Owner", "email": email, "password": password }))
        .send()
        .await
        .expect("owner register request failed");
    assert!(
        resp.status() == StatusCode::CREATED || resp.status() == StatusCode::CONFLICT,
        "unexpected owner register status: {}",
        resp.status()
    );

    let resp = client
        .post(format!("{}/owners/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("owner login request failed");
    let body: Value = resp.json().await.expect("owner login body not JSON");
    body["access_token"]
        .as_str()
        .expect("no access_token")
        .to_string()
}

async fn toggle(client: &Client, token: &str, video_id: &str) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}/likes/toggle/{video_id}", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("toggle request failed");
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
#[ignore = "Requires running server, migrated database, and seeded video"]
async fn test_like_then_unlike_restores_count() {
    let client = Client::new();
    let token = customer_token(&client).await;
    let video_id = test_video_id();

    let (status, first) = toggle(&client, &token, &video_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["is_liked"].as_bool(), Some(true));
    let liked_count = first["likes_count"].as_i64().expect("no likes_count");

    let (status, second) = toggle(&client, &token, &video_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["is_liked"].as_bool(), Some(false));
    assert_eq!(second["likes_count"].as_i64(), Some(liked_count - 1));
}

#[tokio::test]
#[ignore = "Requires running server, migrated database, and seeded video"]
async fn test_toggle_unknown_video_is_not_found() {
    let client = Client::new();
    let token = customer_token(&client).await;

    let (status, _body) = toggle(&client, &token, &Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server, migrated database, seeded video, and owner credentials"]
async fn test_owner_token_can_toggle_like() {
    let client = Client::new();
    let token = owner_token(&client).await;
    let video_id = test_video_id();

    let (status, first) = toggle(&client, &token, &video_id).await;
    assert_eq!(status, StatusCode::OK);
    let was_liked = first["is_liked"].as_bool().expect("no is_liked");

    // Toggle back so the run leaves the like set as it found it.
    let (status, second) = toggle(&client, &token, &video_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["is_liked"].as_bool(), Some(!was_liked));
}

#[tokio::test]
#[ignore = "Requires running server, migrated database, and seeded video"]
async fn test_toggle_requires_authentication() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/likes/toggle/{}", base_url(), test_video_id()))
        .send()
        .await
        .expect("toggle request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
