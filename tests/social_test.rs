//! Integration tests for the follow/unfollow endpoints.
//!
//! These run against a live server + database; start one on localhost:8000
//! (or set CHESSSTATS_TEST_URL) and run with `cargo test -- --ignored`.

mod common;

use serde_json::{json, Value};

/// Register a throwaway account and return its bearer token.
async fn register_and_get_token(client: &reqwest::Client) -> String {
    let suffix = common::unique_suffix();
    let resp = client
        .post(common::url("/api/auth/register"))
        .json(&json!({
            "username": format!("social_{suffix}"),
            "email": format!("social_{suffix}@chessstats.dev"),
            "password": "testpass123",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Follow → is-following → unfollow → is-following round trip.
#[tokio::test]
#[ignore = "requires a running server and database"]
async fn follow_unfollow_round_trip() {
    let client = common::client();
    let token = register_and_get_token(&client).await;

    let resp = client
        .post(common::url("/api/social/follow"))
        .bearer_auth(&token)
        .json(&json!({ "username": "Hikaru" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(common::url("/api/social/follow/hikaru"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["following"], true, "Key is case-normalized");

    let resp = client
        .delete(common::url("/api/social/follow/HIKARU"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(common::url("/api/social/follow/hikaru"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["following"], false);
}

/// Following twice (with different casing) keeps a single edge.
#[tokio::test]
#[ignore = "requires a running server and database"]
async fn follow_is_idempotent() {
    let client = common::client();
    let token = register_and_get_token(&client).await;

    for username in ["MagnusCarlsen", "magnuscarlsen"] {
        let resp = client
            .post(common::url("/api/social/follow"))
            .bearer_auth(&token)
            .json(&json!({ "username": username }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = client
        .get(common::url("/api/social/following"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 1, "Duplicate follows should collapse");
    // The most recent write's casing is the stored one.
    assert_eq!(body["players"][0]["username"], "magnuscarlsen");
}

/// Unfollowing someone never followed is a no-op, not an error.
#[tokio::test]
#[ignore = "requires a running server and database"]
async fn unfollow_unknown_target_is_noop() {
    let client = common::client();
    let token = register_and_get_token(&client).await;

    let resp = client
        .delete(common::url("/api/social/follow/nobody_at_all"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

/// The following list is ordered by most recent follow first.
#[tokio::test]
#[ignore = "requires a running server and database"]
async fn following_list_is_recency_ordered() {
    let client = common::client();
    let token = register_and_get_token(&client).await;

    for username in ["first_follow", "second_follow", "third_follow"] {
        let resp = client
            .post(common::url("/api/social/follow"))
            .bearer_auth(&token)
            .json(&json!({ "username": username }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = client
        .get(common::url("/api/social/following"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(body["players"][0]["username"], "third_follow");
    assert_eq!(body["players"][2]["username"], "first_follow");
}

/// Social endpoints require authentication.
#[tokio::test]
#[ignore = "requires a running server and database"]
async fn social_requires_auth() {
    let client = common::client();

    let resp = client
        .post(common::url("/api/social/follow"))
        .json(&json!({ "username": "anyone" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(common::url("/api/social/following"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
