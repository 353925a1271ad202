//! Authentication module entry point.
//!
//! Exposes the authentication stack: password hashing, the token service,
//! the request authentication middleware, and the register/login flow.

pub mod account_service;
pub mod hashing;
pub mod middleware;
pub mod models;
pub mod token_service;

pub use account_service::AccountService;
pub use middleware::{AuthFilterState, PUBLIC_PATHS};
pub use models::{AuthFlowError, AuthenticatedIdentity};
pub use token_service::{Claims, TokenError, TokenService};
