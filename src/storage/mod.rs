//! # Storage Layer
//!
//! SQLite-backed persistence: pool construction, embedded migrations, and the
//! user repository.

pub mod repository;

pub use repository::{NewUser, SqlxUserRepository, UpdateUser, UserRecord, UserRepository};

use crate::config::DatabaseConfig;
use crate::errors::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;

/// Shared database pool type
pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool from the database configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout())
        .connect(&config.url)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: format!("Failed to connect to database at '{}'", config.url),
        })
}

/// Run embedded migrations against the pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| Error::internal(format!("Failed to run migrations: {}", err)))?;
    tracing::debug!("database migrations applied");
    Ok(())
}
