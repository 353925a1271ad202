use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::{
    middleware::{authenticate, AuthFilterState},
    AccountService, TokenService,
};
use crate::config::AuthConfig;
use crate::storage::{DbPool, SqlxUserRepository, UserRepository};

use super::handlers::{
    delete_user_handler, get_user_handler, health_handler, list_users_handler, login_handler,
    register_handler, update_user_handler,
};

/// Shared handler state. Collaborators are constructor-supplied so tests can
/// assemble the router against an in-memory database.
#[derive(Clone)]
pub struct ApiState {
    pub accounts: AccountService,
    pub users: Arc<dyn UserRepository>,
}

/// Assemble the application router.
///
/// The authentication middleware wraps every route; it bypasses the public
/// paths internally and otherwise establishes identity without enforcing it.
pub fn build_router(pool: DbPool, auth_config: &AuthConfig) -> Router {
    let tokens = Arc::new(TokenService::new(
        auth_config.jwt_secret.as_bytes(),
        auth_config.token_ttl(),
    ));
    let users: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool));
    let accounts = AccountService::new(users.clone(), tokens.clone());

    let auth_layer =
        middleware::from_fn_with_state(AuthFilterState { tokens, users: users.clone() }, authenticate);

    let state = ApiState { accounts, users };

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/users", get(list_users_handler))
        .route(
            "/users/{id}",
            get(get_user_handler).put(update_user_handler).delete(delete_user_handler),
        )
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(auth_layer)
        .layer(TraceLayer::new_for_http())
}
