//! User CRUD handlers.
//!
//! These endpoints sit behind the authentication middleware, but per the
//! layer's contract they do not themselves enforce access control: an
//! unauthenticated request still reaches them with no identity attached.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::hashing::{self, HashError};
use crate::auth::models::AuthenticatedIdentity;
use crate::domain::UserId;
use crate::errors::Error;
use crate::storage::{UpdateUser, UserRecord};

use super::auth::MessageResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        // The password hash never leaves the storage layer.
        Self {
            id: user.id,
            username: user.username,
            roles: user.roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: Option<String>,
}

/// `GET /users`
pub async fn list_users_handler(
    State(state): State<ApiState>,
    identity: Option<Extension<AuthenticatedIdentity>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    if let Some(Extension(identity)) = identity {
        debug!(username = %identity.username, "listing users");
    }
    let users = state.users.list_users(params.limit, params.offset).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `GET /users/{id}`
pub async fn get_user_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = UserId::new(id);
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("User", id.to_string()))?;
    Ok(Json(user.into()))
}

/// `PUT /users/{id}`. Updates username and/or password; a supplied password
/// is re-hashed before it touches storage.
pub async fn update_user_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(Error::from)?;

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(hashing::hash_password(password).map_err(map_hash_error)?),
        None => None,
    };

    state
        .users
        .update_user(
            &UserId::new(id),
            UpdateUser { username: payload.username, password_hash, roles: None },
        )
        .await?;

    Ok(Json(MessageResponse { message: "User updated successfully".to_string() }))
}

/// `DELETE /users/{id}`
pub async fn delete_user_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.delete_user(&UserId::new(id)).await?;
    Ok(Json(MessageResponse { message: "User deleted successfully".to_string() }))
}

fn map_hash_error(err: HashError) -> ApiError {
    match err {
        HashError::EmptyPassword => ApiError::BadRequest("password must not be empty".to_string()),
        HashError::MalformedHash | HashError::Hashing(_) => ApiError::Internal(err.to_string()),
    }
}
