//! Tests for the authentication filter as observed over full HTTP requests.
//!
//! The filter never rejects a request on its own. Every outcome here is a
//! forwarded request; what varies is whether an identity rides along.

mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use common::{login_token, read_json, register, send_request, setup_test_app};

#[tokio::test]
async fn request_without_authorization_header_still_reaches_handler() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/users", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_with_non_bearer_scheme_is_forwarded_without_identity() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/users")
        .header("Authorization", "Basic YWxpY2U6cHcx")
        .body(Body::empty())
        .expect("build request");

    let response = app.router().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_with_garbage_token_is_forwarded() {
    let app = setup_test_app().await;

    let response =
        send_request(&app, Method::GET, "/users", Some("not.a.token"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_with_tampered_token_is_forwarded() {
    let app = setup_test_app().await;
    assert_eq!(register(&app, "alice", "password-one").await, StatusCode::OK);
    let token = login_token(&app, "alice", "password-one").await;

    // Flip the last signature character.
    let mut tampered = token.clone();
    let last = tampered.pop().expect("non-empty token");
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = send_request(&app, Method::GET, "/users", Some(&tampered), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_with_expired_token_is_forwarded() {
    let app = setup_test_app().await;
    assert_eq!(register(&app, "alice", "password-one").await, StatusCode::OK);

    let tokens = app.token_service(Duration::from_secs(1));
    let token = tokens.issue("alice").expect("issue token");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let response = send_request(&app, Method::GET, "/users", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_for_deleted_user_is_forwarded_without_identity() {
    let app = setup_test_app().await;
    assert_eq!(register(&app, "alice", "password-one").await, StatusCode::OK);
    let token = login_token(&app, "alice", "password-one").await;

    let response = send_request(&app, Method::DELETE, "/users/1", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The token still verifies, but the subject no longer exists. The
    // request goes through without an identity rather than failing.
    let response = send_request(&app, Method::GET, "/users", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body.as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn register_and_login_bypass_the_filter_even_with_bad_tokens() {
    let app = setup_test_app().await;

    // A garbage bearer token on a public path must not interfere.
    let response = send_request(
        &app,
        Method::POST,
        "/register",
        Some("garbage-token"),
        Some(serde_json::json!({ "username": "alice", "password": "password-one" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_request(
        &app,
        Method::POST,
        "/login",
        Some("garbage-token"),
        Some(serde_json::json!({ "username": "alice", "password": "password-one" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
