//! Axum middleware establishing per-request identity from bearer tokens.
//!
//! Terminal states per request:
//! - **Bypassed**: public paths (`/register`, `/login`) are forwarded
//!   untouched.
//! - **Unauthenticated pass-through**: missing or non-Bearer Authorization
//!   header, failed token verification, unknown subject, or a repository
//!   failure. The request is forwarded with no identity; this layer never
//!   rejects and never retries. Enforcement, if any, is downstream.
//! - **Authenticated**: the verified subject resolved to a user and an
//!   [`AuthenticatedIdentity`] was inserted into the request extensions.
//!
//! Every branch forwards to the next layer exactly once.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, field, info_span, warn, Instrument};

use crate::auth::models::AuthenticatedIdentity;
use crate::auth::token_service::TokenService;
use crate::storage::UserRepository;

/// Paths that bypass authentication entirely.
pub const PUBLIC_PATHS: &[&str] = &["/register", "/login"];

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthFilterState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserRepository>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Middleware entry point that authenticates requests using the configured
/// [`TokenService`] and user repository.
pub async fn authenticate(
    State(state): State<AuthFilterState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if PUBLIC_PATHS.contains(&path) {
        return next.run(request).await;
    }

    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %request.method(),
        http.path = %path,
        request_id = %uuid::Uuid::new_v4(),
        auth.username = field::Empty
    );

    async move {
        let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
            debug!("no bearer token presented, forwarding unauthenticated");
            return next.run(request).await;
        };

        let subject = match state.tokens.verify(&token) {
            Ok(subject) => subject,
            Err(err) => {
                // Verification failures are absorbed here; the client sees no
                // error from this layer.
                debug!(error = %err, "token verification failed, forwarding unauthenticated");
                return next.run(request).await;
            }
        };

        // Idempotent: never overwrite an identity established earlier in the
        // chain.
        if request.extensions().get::<AuthenticatedIdentity>().is_none() {
            match state.users.find_by_username(&subject).await {
                Ok(Some(user)) => {
                    tracing::Span::current()
                        .record("auth.username", field::display(&user.username));
                    debug!(user_id = %user.id, "request authenticated");
                    request
                        .extensions_mut()
                        .insert(AuthenticatedIdentity::new(user.username, user.roles));
                }
                Ok(None) => {
                    debug!(subject = %subject, "token subject no longer exists, forwarding unauthenticated");
                }
                Err(err) => {
                    // No retry: a failed lookup is an unauthenticated pass-through.
                    warn!(error = %err, "user lookup failed during authentication, forwarding unauthenticated");
                }
            }
        }

        next.run(request).await
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqlxUserRepository;
    use axum::{middleware, routing::get, Extension, Router};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn probe(identity: Option<Extension<AuthenticatedIdentity>>) -> String {
        match identity {
            Some(Extension(identity)) => format!("identity:{}", identity.username),
            None => "anonymous".to_string(),
        }
    }

    async fn test_state() -> AuthFilterState {
        // One connection so every handle sees the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("create sqlite pool");
        crate::storage::run_migrations(&pool).await.expect("run migrations");
        AuthFilterState {
            tokens: Arc::new(TokenService::new(
                b"unit-test-secret-0123456789abcdef",
                Duration::from_secs(3600),
            )),
            users: Arc::new(SqlxUserRepository::new(pool)),
        }
    }

    fn test_router(state: AuthFilterState) -> Router {
        Router::new()
            .route("/probe", get(probe))
            .route("/register", get(probe))
            .layer(middleware::from_fn_with_state(state, authenticate))
    }

    async fn body_of(router: Router, request: Request<Body>) -> String {
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_forwards_unauthenticated() {
        let router = test_router(test_state().await);
        let request = Request::builder().uri("/probe").body(Body::empty()).unwrap();
        assert_eq!(body_of(router, request).await, "anonymous");
    }

    #[tokio::test]
    async fn non_bearer_scheme_forwards_unauthenticated() {
        let router = test_router(test_state().await);
        let request = Request::builder()
            .uri("/probe")
            .header(AUTHORIZATION, "Basic YWxpY2U6cHcx")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(router, request).await, "anonymous");
    }

    #[tokio::test]
    async fn garbage_token_forwards_unauthenticated() {
        let router = test_router(test_state().await);
        let request = Request::builder()
            .uri("/probe")
            .header(AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(router, request).await, "anonymous");
    }

    #[tokio::test]
    async fn valid_token_for_unknown_user_forwards_unauthenticated() {
        let state = test_state().await;
        let token = state.tokens.issue("ghost").unwrap();
        let router = test_router(state);
        let request = Request::builder()
            .uri("/probe")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(router, request).await, "anonymous");
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let state = test_state().await;
        state
            .users
            .create_user(crate::storage::NewUser {
                username: "alice".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                roles: vec!["user".to_string()],
            })
            .await
            .unwrap();
        let token = state.tokens.issue("alice").unwrap();
        let router = test_router(state);
        let request = Request::builder()
            .uri("/probe")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(router, request).await, "identity:alice");
    }

    #[tokio::test]
    async fn public_path_bypasses_verification() {
        let router = test_router(test_state().await);
        // A token that would fail verification must not matter on a public path.
        let request = Request::builder()
            .uri("/register")
            .header(AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap();
        assert_eq!(body_of(router, request).await, "anonymous");
    }
}
