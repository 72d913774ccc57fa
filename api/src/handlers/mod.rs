//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod admin;
pub mod models;
pub mod users;

pub use admin::{list_review_queue, review_model, review_stats};
pub use models::{
    engage_model, get_model, list_models, list_my_models, submit_model, update_model,
};
pub use users::register;
