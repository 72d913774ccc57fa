//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::entities::{
    LikeOutcome, ModelId, ModelRecord, ModelStatus, NewDownloadEvent,
    NewModelRecord, NewUser, PageRequest, PublishedQuery, ReviewDecision, ReviewFilter, ReviewSort, ReviewStats, User,
    UserId,
};
use crate::domain::ports::{EngagementRepository, ModelRepository, UserRepository};
use crate::error::DomainError;

type ModelStore = Arc<RwLock<HashMap<ModelId, ModelRecord>>>;

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }

    /// Snapshot of a stored user
    pub fn get(&self, id: &UserId) -> Option<User> {
        self.users.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.api_key_hash == hash).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.name == name).cloned())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.name == new_user.name) {
            return Err(DomainError::Conflict(format!(
                "User with name '{}' already exists",
                new_user.name
            )));
        }

        let user = User {
            id: UserId(Uuid::new_v4()),
            name: new_user.name.clone(),
            api_key_hash: new_user.api_key_hash.clone(),
            role: new_user.role,
            created_at: Utc::now(),
            last_seen_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        if let Some(user) = users.get_mut(id) {
            user.last_seen_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Model Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryModelRepository {
    models: ModelStore,
    /// When set, `increment_views` fails
    pub fail_view_increments: Arc<RwLock<bool>>,
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a model for testing
    pub fn with_model(self, model: ModelRecord) -> Self {
        self.models.write().unwrap().insert(model.id, model);
        self
    }

    /// View increments fail; everything else works
    pub fn with_failing_view_increments(self) -> Self {
        *self.fail_view_increments.write().unwrap() = true;
        self
    }

    /// Snapshot of a stored model
    pub fn get(&self, id: &ModelId) -> Option<ModelRecord> {
        self.models.read().unwrap().get(id).cloned()
    }

    /// Handle to the underlying store, shared with the engagement mock
    pub fn store(&self) -> ModelStore {
        Arc::clone(&self.models)
    }
}

#[async_trait]
impl ModelRepository for InMemoryModelRepository {
    async fn create(&self, model: &NewModelRecord) -> Result<ModelRecord, DomainError> {
        let mut models = self.models.write().unwrap();
        if models
            .values()
            .any(|m| m.author_id == model.author_id && m.content.title == model.content.title)
        {
            return Err(DomainError::Conflict(
                "You already have a model with this title".to_string(),
            ));
        }

        let record = ModelRecord::submitted(model.clone(), Utc::now());
        models.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &ModelId) -> Result<Option<ModelRecord>, DomainError> {
        Ok(self.models.read().unwrap().get(id).cloned())
    }

    async fn title_taken(
        &self,
        author_id: &UserId,
        title: &str,
        except: Option<&ModelId>,
    ) -> Result<bool, DomainError> {
        let models = self.models.read().unwrap();
        Ok(models.values().any(|m| {
            m.author_id == *author_id && m.content.title == title && Some(&m.id) != except
        }))
    }

    async fn update_content(
        &self,
        model: &ModelRecord,
        expected: ModelStatus,
    ) -> Result<(), DomainError> {
        let mut models = self.models.write().unwrap();
        let stored = models
            .get_mut(&model.id)
            .ok_or_else(|| DomainError::NotFound(format!("Model {} not found", model.id)))?;
        if stored.status != expected {
            return Err(DomainError::Conflict(
                "Model was reviewed while you were editing it".to_string(),
            ));
        }

        stored.content = model.content.clone();
        stored.status = model.status;
        stored.rejection_reason = model.rejection_reason.clone();
        stored.updated_at = model.updated_at;
        Ok(())
    }

    async fn apply_review(
        &self,
        id: &ModelId,
        decision: &ReviewDecision,
        moderator: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ModelRecord>, DomainError> {
        let mut models = self.models.write().unwrap();
        Ok(models.get_mut(id).map(|model| {
            model.apply_review(decision, *moderator, at);
            model.clone()
        }))
    }

    async fn list_for_review(
        &self,
        filter: ReviewFilter,
        sort: ReviewSort,
        page: PageRequest,
    ) -> Result<(Vec<ModelRecord>, u64), DomainError> {
        let models = self.models.read().unwrap();
        let mut matching: Vec<ModelRecord> =
            models.values().filter(|m| filter.matches(m)).cloned().collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let total = matching.len() as u64;
        Ok((paginate(matching, page), total))
    }

    async fn review_stats(&self) -> Result<ReviewStats, DomainError> {
        let models = self.models.read().unwrap();
        Ok(ReviewStats::tally(models.values()))
    }

    async fn list_published(
        &self,
        query: &PublishedQuery,
    ) -> Result<Vec<ModelRecord>, DomainError> {
        let models = self.models.read().unwrap();
        let mut matching: Vec<ModelRecord> =
            models.values().filter(|m| query.matches(m)).cloned().collect();
        matching.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(paginate(matching, query.page))
    }

    async fn find_by_author(
        &self,
        author_id: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ModelRecord>, DomainError> {
        let models = self.models.read().unwrap();
        let mut mine: Vec<ModelRecord> = models
            .values()
            .filter(|m| m.author_id == *author_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(mine, page))
    }

    async fn increment_views(&self, id: &ModelId) -> Result<(), DomainError> {
        if *self.fail_view_increments.read().unwrap() {
            return Err(DomainError::Database("view counter unavailable".to_string()));
        }

        if let Some(model) = self.models.write().unwrap().get_mut(id) {
            model.views += 1;
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Engagement Repository
// ============================================================================

/// Likes and downloads over the same store as an `InMemoryModelRepository`,
/// so counters move together with edges and events.
pub struct InMemoryEngagementRepository {
    models: ModelStore,
    likes: Arc<RwLock<HashSet<(UserId, ModelId)>>>,
    downloads: Arc<RwLock<Vec<NewDownloadEvent>>>,
}

impl InMemoryEngagementRepository {
    pub fn new(models: &InMemoryModelRepository) -> Self {
        Self {
            models: models.store(),
            likes: Arc::default(),
            downloads: Arc::default(),
        }
    }

    /// Recorded download events, oldest first
    pub fn download_events(&self) -> Vec<NewDownloadEvent> {
        self.downloads.read().unwrap().clone()
    }

    /// Number of like edges on a model
    pub fn like_edges(&self, model_id: &ModelId) -> usize {
        self.likes
            .read()
            .unwrap()
            .iter()
            .filter(|(_, m)| m == model_id)
            .count()
    }
}

fn model_not_found(model_id: &ModelId) -> DomainError {
    DomainError::NotFound(format!("Model {} not found", model_id))
}

#[async_trait]
impl EngagementRepository for InMemoryEngagementRepository {
    async fn has_liked(&self, user_id: &UserId, model_id: &ModelId) -> Result<bool, DomainError> {
        Ok(self.likes.read().unwrap().contains(&(*user_id, *model_id)))
    }

    async fn like(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<LikeOutcome, DomainError> {
        // Lock order: models, then likes
        let mut models = self.models.write().unwrap();
        let model = models
            .get_mut(model_id)
            .ok_or_else(|| model_not_found(model_id))?;

        let mut likes = self.likes.write().unwrap();
        if !likes.insert((*user_id, *model_id)) {
            return Err(DomainError::Conflict("Model already liked".to_string()));
        }
        model.likes += 1;

        Ok(LikeOutcome { likes: model.likes })
    }

    async fn unlike(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut models = self.models.write().unwrap();
        let mut likes = self.likes.write().unwrap();
        if !likes.remove(&(*user_id, *model_id)) {
            return Ok(None);
        }

        let model = models
            .get_mut(model_id)
            .ok_or_else(|| model_not_found(model_id))?;
        model.likes = (model.likes - 1).max(0);

        Ok(Some(LikeOutcome { likes: model.likes }))
    }

    async fn count_likes(&self, model_id: &ModelId) -> Result<u64, DomainError> {
        Ok(self.like_edges(model_id) as u64)
    }

    async fn latest_download(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let downloads = self.downloads.read().unwrap();
        Ok(downloads
            .iter()
            .filter(|e| e.user_id == *user_id && e.model_id == *model_id)
            .map(|e| e.at)
            .max())
    }

    async fn record_download(&self, event: &NewDownloadEvent) -> Result<i64, DomainError> {
        let mut models = self.models.write().unwrap();
        let model = models
            .get_mut(&event.model_id)
            .ok_or_else(|| model_not_found(&event.model_id))?;

        self.downloads.write().unwrap().push(event.clone());
        model.downloads += 1;

        Ok(model.downloads)
    }
}
