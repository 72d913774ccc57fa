//! Engagement service
//!
//! Likes and downloads on published models. Each counter moves in the same
//! transaction as the like edge or download event behind it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    DownloadDebounce, DownloadOutcome, LikeOutcome, ModelId, ModelRecord, NewDownloadEvent, UserId,
};
use crate::domain::ports::{EngagementRepository, ModelRepository};
use crate::error::{AppError, DomainError};

/// Service for likes and downloads
pub struct EngagementService<MR, ER>
where
    MR: ModelRepository,
    ER: EngagementRepository,
{
    models: Arc<MR>,
    engagement: Arc<ER>,
    debounce: DownloadDebounce,
}

impl<MR, ER> EngagementService<MR, ER>
where
    MR: ModelRepository,
    ER: EngagementRepository,
{
    pub fn new(models: Arc<MR>, engagement: Arc<ER>, debounce: DownloadDebounce) -> Self {
        Self {
            models,
            engagement,
            debounce,
        }
    }

    /// Like a published, public model the user does not own
    pub async fn like(&self, model_id: &ModelId, user_id: &UserId) -> Result<LikeOutcome, AppError> {
        let model = self.find(model_id).await?;

        if model.is_owned_by(user_id) {
            return Err(DomainError::Forbidden("You cannot like your own model".to_string()).into());
        }
        if !model.is_publicly_visible() {
            return Err(
                DomainError::Forbidden("This model is not available for likes".to_string()).into(),
            );
        }

        let outcome = self.engagement.like(user_id, model_id).await?;
        tracing::debug!(model_id = %model_id, user_id = %user_id, likes = outcome.likes, "Model liked");
        Ok(outcome)
    }

    /// Remove the user's like
    pub async fn unlike(
        &self,
        model_id: &ModelId,
        user_id: &UserId,
    ) -> Result<LikeOutcome, AppError> {
        self.find(model_id).await?;

        let outcome = self
            .engagement
            .unlike(user_id, model_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Like not found".to_string()))?;

        tracing::debug!(model_id = %model_id, user_id = %user_id, likes = outcome.likes, "Model unliked");
        Ok(outcome)
    }

    /// Whether the user currently likes the model
    pub async fn has_liked(&self, model_id: &ModelId, user_id: &UserId) -> Result<bool, AppError> {
        Ok(self.engagement.has_liked(user_id, model_id).await?)
    }

    /// Record a download, debounced per user
    pub async fn download(
        &self,
        model_id: &ModelId,
        user_id: &UserId,
        source: Option<String>,
    ) -> Result<DownloadOutcome, AppError> {
        self.download_at(model_id, user_id, source, Utc::now()).await
    }

    /// Record a download as of `now`. A repeat inside the debounce window
    /// succeeds without counting.
    pub async fn download_at(
        &self,
        model_id: &ModelId,
        user_id: &UserId,
        source: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<DownloadOutcome, AppError> {
        let model = self.find(model_id).await?;

        if !model.is_publicly_visible() {
            return Err(
                DomainError::Forbidden("This model is not available for download".to_string())
                    .into(),
            );
        }

        let download_url = model.download_url().map(str::to_string);
        let last = self.engagement.latest_download(user_id, model_id).await?;

        if !self.debounce.should_count(last, now) {
            tracing::debug!(
                model_id = %model_id,
                user_id = %user_id,
                "Repeat download inside debounce window, not counted"
            );
            return Ok(DownloadOutcome {
                downloads: model.downloads,
                counted: false,
                download_url,
            });
        }

        let downloads = self
            .engagement
            .record_download(&NewDownloadEvent {
                user_id: *user_id,
                model_id: *model_id,
                source: source
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                at: now,
            })
            .await?;

        Ok(DownloadOutcome {
            downloads,
            counted: true,
            download_url,
        })
    }

    async fn find(&self, id: &ModelId) -> Result<ModelRecord, AppError> {
        self.models
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Model {} not found", id)).into())
    }
}
