//! # Turnstile
//!
//! A minimal token-based authentication layer for HTTP services: users
//! register with a username and password, log in to receive a signed bearer
//! token, and subsequent requests are authenticated by verifying that token
//! and attaching an identity to the request.
//!
//! ## Architecture
//!
//! ```text
//! client → authentication middleware → handlers
//!              ↓ (verify token,            ↓
//!               resolve identity)     user repository
//! ```
//!
//! ## Core Components
//!
//! - **Authentication middleware**: bearer extraction, token verification,
//!   per-request identity — permissive by design, enforcement is downstream
//! - **Token service**: HS256 JWT issuance and verification
//! - **Account service**: registration and login flows over Argon2 hashes
//! - **Storage**: SQLx/SQLite user repository
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use turnstile::{api, config::AppConfig, storage, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let pool = storage::create_pool(&config.database).await?;
//!     storage::run_migrations(&pool).await?;
//!     let router = api::build_router(pool, &config.auth);
//!     api::start_api_server(&config.server, router).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "turnstile");
    }
}
