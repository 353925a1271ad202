use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::auth::models::AuthFlowError;
use crate::errors::Error;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let unique_violation = err.is_unique_violation();
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            err @ Error::NotFound { .. } => ApiError::NotFound(err.to_string()),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Database { context, .. } => {
                if unique_violation {
                    ApiError::Conflict(context)
                } else {
                    ApiError::Internal(context)
                }
            }
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
            Error::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthFlowError> for ApiError {
    fn from(err: AuthFlowError) -> Self {
        match err {
            AuthFlowError::DuplicateUsername(username) => {
                ApiError::Conflict(format!("username '{}' is already taken", username))
            }
            // Deliberately vague: unknown user and wrong password look the same.
            AuthFlowError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthFlowError::Persistence(inner) => ApiError::from(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_flow_errors_map_to_expected_statuses() {
        let conflict: ApiError = AuthFlowError::DuplicateUsername("alice".to_string()).into();
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let unauthorized: ApiError = AuthFlowError::InvalidCredentials.into();
        assert_eq!(unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let bad_request: ApiError = Error::validation("bad").into();
        assert_eq!(bad_request.status_code(), StatusCode::BAD_REQUEST);

        let not_found: ApiError = Error::not_found("User", "9").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let internal: ApiError = Error::internal("boom").into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
