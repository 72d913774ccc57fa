//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    LikeOutcome, ModelId, ModelRecord, ModelStatus, NewDownloadEvent, NewModelRecord, NewUser,
    PageRequest, PublishedQuery, ReviewDecision, ReviewFilter, ReviewSort, ReviewStats, User,
    UserId,
};
use crate::error::DomainError;

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find several users at once; missing IDs are skipped
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError>;

    /// Find a user by API key hash
    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by name
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user. Duplicate names fail with `Conflict`.
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Update the last seen timestamp
    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError>;
}

/// Repository for submitted models and their moderation state
#[async_trait]
pub trait ModelRepository: Send + Sync {
    /// Insert a new record in `verification` with zeroed counters.
    /// A duplicate title for the same author fails with `Conflict`.
    async fn create(&self, model: &NewModelRecord) -> Result<ModelRecord, DomainError>;

    /// Find a model by ID
    async fn find_by_id(&self, id: &ModelId) -> Result<Option<ModelRecord>, DomainError>;

    /// Whether the author already has a model with this title, ignoring `except`
    async fn title_taken(
        &self,
        author_id: &UserId,
        title: &str,
        except: Option<&ModelId>,
    ) -> Result<bool, DomainError>;

    /// Persist content fields, status and rejection reason of an edited record,
    /// provided the stored status is still `expected`.
    /// A record whose status moved on fails with `Conflict`; a missing one with `NotFound`.
    async fn update_content(
        &self,
        model: &ModelRecord,
        expected: ModelStatus,
    ) -> Result<(), DomainError>;

    /// Atomically apply a moderator decision. Returns `None` if the record is absent.
    async fn apply_review(
        &self,
        id: &ModelId,
        decision: &ReviewDecision,
        moderator: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ModelRecord>, DomainError>;

    /// One page of the review queue plus the number of records matching `filter`
    async fn list_for_review(
        &self,
        filter: ReviewFilter,
        sort: ReviewSort,
        page: PageRequest,
    ) -> Result<(Vec<ModelRecord>, u64), DomainError>;

    /// Status counts over every record
    async fn review_stats(&self) -> Result<ReviewStats, DomainError>;

    /// Published, public models for the browse feed, newest publication first
    async fn list_published(&self, query: &PublishedQuery)
        -> Result<Vec<ModelRecord>, DomainError>;

    /// All of an author's models, newest first
    async fn find_by_author(
        &self,
        author_id: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ModelRecord>, DomainError>;

    /// Add one to the view counter
    async fn increment_views(&self, id: &ModelId) -> Result<(), DomainError>;
}

/// Repository for likes and downloads.
///
/// Every mutator keeps the counter on the model in lockstep with the edge or
/// event it writes, inside one transaction.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Whether the user currently likes the model
    async fn has_liked(&self, user_id: &UserId, model_id: &ModelId) -> Result<bool, DomainError>;

    /// Create the like edge and increment `likes`.
    /// An existing edge fails with `Conflict`; a missing model with `NotFound`.
    async fn like(&self, user_id: &UserId, model_id: &ModelId)
        -> Result<LikeOutcome, DomainError>;

    /// Delete the like edge and decrement `likes`, floored at zero.
    /// Returns `None` if there was no edge.
    async fn unlike(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<Option<LikeOutcome>, DomainError>;

    /// Number of like edges pointing at the model
    async fn count_likes(&self, model_id: &ModelId) -> Result<u64, DomainError>;

    /// Timestamp of the user's most recent counted download of the model
    async fn latest_download(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<Option<DateTime<Utc>>, DomainError>;

    /// Append a download event and increment `downloads`; returns the new count
    async fn record_download(&self, event: &NewDownloadEvent) -> Result<i64, DomainError>;
}
