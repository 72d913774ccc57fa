//! Authentication
//!
//! Bearer API keys resolved to users, plus the moderator gate for `/admin`.

pub mod api_key;

pub use api_key::{auth_middleware, moderator_middleware, optional_auth_middleware};
