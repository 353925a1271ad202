//! HTTP request handlers.

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{login_handler, register_handler};
pub use health::health_handler;
pub use users::{
    delete_user_handler, get_user_handler, list_users_handler, update_user_handler,
};
