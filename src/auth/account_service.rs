//! Registration and login flows.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing::{self, HashError};
use crate::auth::models::AuthFlowError;
use crate::auth::token_service::TokenService;
use crate::errors::Error;
use crate::storage::{NewUser, SqlxUserRepository, UserRecord, UserRepository};

/// Role granted to every newly registered user.
const DEFAULT_ROLE: &str = "user";

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When an unknown username is used, we still run Argon2 verification against
/// this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Service driving the register and login endpoints.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, tokens: Arc<TokenService>) -> Self {
        Self::new(Arc::new(SqlxUserRepository::new(pool)), tokens)
    }

    /// Register a new user: hash the password, persist the record.
    ///
    /// Duplicate detection rides on the repository's atomic create: the
    /// UNIQUE constraint decides the winner under concurrent registration,
    /// not a read-then-write check.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, AuthFlowError> {
        let password_hash = hashing::hash_password(password).map_err(map_hash_error)?;

        let user = self
            .users
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                roles: vec![DEFAULT_ROLE.to_string()],
            })
            .await
            .map_err(|err| {
                if err.is_unique_violation() {
                    warn!(username = %username, "registration attempt for taken username");
                    AuthFlowError::DuplicateUsername(username.to_string())
                } else {
                    AuthFlowError::Persistence(err)
                }
            })?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate with username and password; on success issue a token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller, in both response and timing.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserRecord, String), AuthFlowError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                // Burn the same Argon2 work as a real verification.
                if let Err(err) = hashing::verify_password(password, &DUMMY_HASH) {
                    warn!(error = %err, "dummy hash verification failed unexpectedly");
                }
                warn!(username = %username, "login attempt for unknown user");
                return Err(AuthFlowError::InvalidCredentials);
            }
        };

        let password_matches =
            hashing::verify_password(password, &user.password_hash).map_err(map_hash_error)?;
        if !password_matches {
            warn!(user_id = %user.id, username = %username, "login attempt with incorrect password");
            return Err(AuthFlowError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.username)?;
        info!(user_id = %user.id, username = %user.username, "user logged in");
        Ok((user, token))
    }
}

fn map_hash_error(err: HashError) -> AuthFlowError {
    match err {
        HashError::EmptyPassword => {
            AuthFlowError::Persistence(Error::validation("password must not be empty"))
        }
        HashError::MalformedHash | HashError::Hashing(_) => {
            AuthFlowError::Persistence(Error::internal(err.to_string()))
        }
    }
}
