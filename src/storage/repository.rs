//! User repository: CRUD operations for user records.
//!
//! The repository owns username uniqueness. `create_user` performs a single
//! INSERT and relies on the UNIQUE constraint so that concurrent
//! registrations of the same username cannot both succeed.

use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

/// Stored representation of a user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string; never the plaintext.
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// Update payload for an existing user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: String, // JSON array stored as string
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User store collaborator interface.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails with a unique-violation database error if the
    /// username is already taken (atomic w.r.t. concurrent creates).
    async fn create_user(&self, user: NewUser) -> Result<UserRecord>;

    /// Get a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>>;

    /// Get a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Check whether a username is taken
    async fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// Update a user's details
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<UserRecord>;

    /// Delete a user
    async fn delete_user(&self, id: &UserId) -> Result<()>;

    /// List all users (with pagination)
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>>;

    /// Count total users
    async fn count_users(&self) -> Result<i64>;
}

/// SQLite implementation of [`UserRepository`].
#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<UserRecord> {
        let roles: Vec<String> = serde_json::from_str(&row.roles)
            .map_err(|err| Error::internal(format!("Failed to parse roles JSON: {}", err)))?;

        Ok(UserRecord {
            id: UserId::new(row.id),
            username: row.username,
            password_hash: row.password_hash,
            roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<UserRecord> {
        let roles_json = serde_json::to_string(&user.roles)
            .map_err(|err| Error::internal(format!("Failed to serialize roles: {}", err)))?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&roles_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: format!("Failed to create user '{}'", user.username),
        })?;

        let id = UserId::new(result.last_insert_rowid());
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| Error::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_find_user_by_id")]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, roles, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(username = %username), name = "db_find_user_by_username")]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, roles, created_at, updated_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user by username".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(username = %username), name = "db_exists_by_username")]
    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to check username existence".to_string(),
        })?;

        Ok(count > 0)
    }

    #[instrument(skip(self, update), fields(user_id = %id), name = "db_update_user")]
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<UserRecord> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id.to_string()))?;

        let username = update.username.unwrap_or(current.username);
        let password_hash = update.password_hash.unwrap_or(current.password_hash);
        let roles = update.roles.unwrap_or(current.roles);
        let roles_json = serde_json::to_string(&roles)
            .map_err(|err| Error::internal(format!("Failed to serialize roles: {}", err)))?;

        sqlx::query(
            r#"
            UPDATE users
            SET username = $1, password_hash = $2, roles = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(&roles_json)
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to update user".to_string(),
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::internal("User not found after update"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_delete_user")]
    async fn delete_user(&self, id: &UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete user".to_string(),
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(limit = limit, offset = offset), name = "db_list_users")]
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, roles, created_at, updated_at FROM users ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list users".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_user(r)).collect()
    }

    #[instrument(skip(self), name = "db_count_users")]
    async fn count_users(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to count users".to_string(),
            })
    }
}
