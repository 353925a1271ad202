//! Data models for the authentication layer.

use std::collections::HashSet;

use crate::errors::Error;

/// Request-scoped identity derived from a verified token plus a user lookup.
///
/// Lives in the request's extensions; the authentication filter sets it at
/// most once per request and it is dropped when the request completes.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub username: String,
    roles: HashSet<String>,
}

impl AuthenticatedIdentity {
    pub fn new(username: String, roles: Vec<String>) -> Self {
        Self { username, roles: roles.into_iter().collect() }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &String> {
        self.roles.iter()
    }
}

/// Errors returned by the registration/login flow. The filter never produces
/// these; handlers map them to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Persistence(#[from] Error),
}
