// Not every test binary uses every helper.
#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use turnstile::{
    api::routes::build_router,
    auth::TokenService,
    config::AuthConfig,
    storage::{self, DbPool},
};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub pool: DbPool,
    auth_config: AuthConfig,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.pool.clone(), &self.auth_config)
    }

    /// A token service sharing the app's secret, for crafting tokens outside
    /// the login flow.
    pub fn token_service(&self, ttl: Duration) -> TokenService {
        TokenService::new(TEST_SECRET.as_bytes(), ttl)
    }
}

pub async fn setup_test_app() -> TestApp {
    // A single connection so every handle sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("create sqlite pool");

    storage::run_migrations(&pool).await.expect("run migrations for tests");

    let auth_config =
        AuthConfig { jwt_secret: TEST_SECRET.to_string(), token_ttl_seconds: 3600 };

    TestApp { pool, auth_config }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

pub async fn register(app: &TestApp, username: &str, password: &str) -> StatusCode {
    let response = send_request(
        app,
        Method::POST,
        "/register",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    response.status()
}

pub async fn login(app: &TestApp, username: &str, password: &str) -> Response<Body> {
    send_request(
        app,
        Method::POST,
        "/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await
}

pub async fn login_token(app: &TestApp, username: &str, password: &str) -> String {
    let response = login(app, username, password).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    body["token"].as_str().expect("token in response").to_string()
}
