//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod engagement_service;
pub mod moderation_service;
pub mod user_service;

pub use engagement_service::EngagementService;
pub use moderation_service::ModerationService;
pub use user_service::{hash_api_key, UserService};
