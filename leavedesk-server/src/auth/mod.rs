//! Authentication

pub mod user_auth;

pub use user_auth::{CurrentUser, create_token, user_auth_middleware};
