//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod engagement;
pub mod model;
pub mod review;
pub mod user;

pub use engagement::{
    DownloadDebounce, DownloadOutcome, EngagementAction, LikeOutcome, NewDownloadEvent,
};
pub use model::{
    License, ModelContent, ModelContentUpdate, ModelId, ModelPermissions, ModelRecord,
    ModelStatus, ModelView, NewModelRecord, ReviewDecision, Visibility,
};
pub use review::{
    PageRequest, PublishedQuery, ReviewFilter, ReviewPage, ReviewQueueItem, ReviewSort,
    ReviewStats,
};
pub use user::{AuthorSummary, NewUser, User, UserId, UserRole};
