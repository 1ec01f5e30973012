//! Decks API tests.
//!
//! These run against the in-memory store and need no external services.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::fixtures;
use common::TestContext;

/// Test list decks is empty for a new user.
#[tokio::test]
async fn test_list_decks_empty() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_user(None).await;

    let response = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["decks"].as_array().unwrap().is_empty());
}

/// Test deck creation normalizes the submitted fields.
#[tokio::test]
async fn test_create_deck() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (user_id, token) = ctx.create_test_user(Some("alice")).await;

    let response = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({
            "name": "  Rust  ",
            "description": "   ",
            "tags": [" ownership", "lifetimes", "ownership", ""]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["name"], "Rust");
    assert_eq!(body["owner_id"], user_id.to_string());
    assert_eq!(body["tags"], json!(["ownership", "lifetimes"]));
    assert!(body.get("description").is_none());
    assert!(body["last_studied"].is_null());
}

/// Test a blank deck name is rejected.
#[tokio::test]
async fn test_create_deck_blank_name() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_user(None).await;

    let response = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "name": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_input");
}

/// Test list decks reports card counts.
#[tokio::test]
async fn test_list_decks_with_counts() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_user(None).await;
    let auth = TestContext::auth_header_value(&token);

    let deck: Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&fixtures::deck_request("Biology"))
        .await
        .json();
    let deck_id: Uuid = deck["id"].as_str().unwrap().parse().unwrap();

    for i in 0..3 {
        server
            .post("/api/flashcards")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&fixtures::card_request(deck_id, &format!("Q{}", i), "A"))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, auth.clone())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let decks = body["decks"].as_array().unwrap();
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0]["name"], "Biology");
    assert_eq!(decks[0]["card_count"], 3);

    let response = server
        .get(&format!("/api/decks/{}", deck_id))
        .add_header(AUTHORIZATION, auth)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["card_count"], 3);
}

/// Test listing the cards of a deck.
#[tokio::test]
async fn test_list_deck_cards() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_user(None).await;
    let auth = TestContext::auth_header_value(&token);

    let deck: Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&fixtures::deck_request("Chemistry"))
        .await
        .json();
    let deck_id: Uuid = deck["id"].as_str().unwrap().parse().unwrap();

    server
        .post("/api/flashcards")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&fixtures::card_request(deck_id, "H2O?", "Water"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get(&format!("/api/decks/{}/cards", deck_id))
        .add_header(AUTHORIZATION, auth)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["front"], "H2O?");
    assert_eq!(cards[0]["interval"], 1);
    assert_eq!(cards[0]["ease_factor"], 2.5);
}

/// Test deleting a deck removes its cards.
#[tokio::test]
async fn test_delete_deck_cascades() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_user(None).await;
    let auth = TestContext::auth_header_value(&token);

    let keep: Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&fixtures::deck_request("Keep"))
        .await
        .json();
    let drop: Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&fixtures::deck_request("Drop"))
        .await
        .json();
    let keep_id: Uuid = keep["id"].as_str().unwrap().parse().unwrap();
    let drop_id: Uuid = drop["id"].as_str().unwrap().parse().unwrap();

    for deck_id in [keep_id, drop_id, drop_id] {
        server
            .post("/api/flashcards")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&fixtures::card_request(deck_id, "Q", "A"))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server
        .delete(&format!("/api/decks/{}", drop_id))
        .add_header(AUTHORIZATION, auth.clone())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted_cards"], 2);
    assert_eq!(ctx.memory().card_total().await, 1);

    server
        .get(&format!("/api/decks/{}", drop_id))
        .add_header(AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Deleting again reports not found
    server
        .delete(&format!("/api/decks/{}", drop_id))
        .add_header(AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// Test another user's deck looks missing.
#[tokio::test]
async fn test_deck_of_other_user_is_not_found() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, owner_token) = ctx.create_test_user(Some("owner")).await;
    let (_, other_token) = ctx.create_test_user(Some("other")).await;

    let deck: Value = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&owner_token))
        .json(&fixtures::deck_request("Private"))
        .await
        .json();
    let deck_id = deck["id"].as_str().unwrap();
    let other = TestContext::auth_header_value(&other_token);

    server
        .get(&format!("/api/decks/{}", deck_id))
        .add_header(AUTHORIZATION, other.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/decks/{}/cards", deck_id))
        .add_header(AUTHORIZATION, other.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/decks/{}", deck_id))
        .add_header(AUTHORIZATION, other.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let body: Value = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, other)
        .await
        .json();
    assert!(body["decks"].as_array().unwrap().is_empty());

    // Still there for the owner
    server
        .get(&format!("/api/decks/{}", deck_id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&owner_token))
        .await
        .assert_status_ok();
}

/// Test deck endpoints require authentication.
#[tokio::test]
async fn test_decks_unauthorized() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/decks").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value("not-a-token"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

/// Test a body without a name is rejected like a blank one.
#[tokio::test]
async fn test_create_deck_missing_name() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (_, token) = ctx.create_test_user(None).await;
    let auth = TestContext::auth_header_value(&token);

    for body in [json!({}), json!({ "name": 42 })] {
        let response = server
            .post("/api/decks")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&body)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "invalid_input");
    }

    let body: Value = server
        .get("/api/decks")
        .add_header(AUTHORIZATION, auth)
        .await
        .json();
    assert!(body["decks"].as_array().unwrap().is_empty());
}
