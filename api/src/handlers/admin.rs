//! Moderator handlers
//!
//! Review queue, dashboard stats and approve/reject. Mounted under `/admin`
//! behind the moderator gate.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{
    ModelId, ModelRecord, PageRequest, ReviewFilter, ReviewPage, ReviewSort, ReviewStats, User,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for the review queue
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueQuery {
    /// all | verification | published | rejected
    pub filter: Option<String>,
    /// newest | oldest | category
    pub sort_by: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ReviewQueueQuery {
    fn parse(self) -> Result<(ReviewFilter, ReviewSort, PageRequest), AppError> {
        let filter = match self.filter.as_deref() {
            Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
            None => ReviewFilter::default(),
        };
        let sort = match self.sort_by.as_deref() {
            Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
            None => ReviewSort::default(),
        };

        Ok((filter, sort, PageRequest::new(self.page, self.limit)))
    }
}

/// Moderator disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// Request body for POST /admin/models/:id/review
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub action: ReviewAction,
    /// Required when rejecting
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
}

/// Response for a review action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub message: String,
    pub model: ModelRecord,
}

/// GET /admin/models
///
/// One page of the review queue. Stats always cover every record.
pub async fn list_review_queue(
    State(state): State<AppState>,
    Query(query): Query<ReviewQueueQuery>,
) -> Result<Json<ReviewPage>, AppError> {
    let (filter, sort, page) = query.parse()?;
    let result = state
        .moderation_service
        .list_for_review(filter, sort, page)
        .await?;

    Ok(Json(result))
}

/// GET /admin/models/stats
pub async fn review_stats(State(state): State<AppState>) -> Result<Json<ReviewStats>, AppError> {
    Ok(Json(state.moderation_service.stats().await?))
}

/// POST /admin/models/:id/review
///
/// Approve or reject a model.
pub async fn review_model(
    State(state): State<AppState>,
    Extension(moderator): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let model_id = ModelId(id);
    let service = &state.moderation_service;

    let (model, message) = match request.action {
        ReviewAction::Approve => (
            service
                .approve(&model_id, &moderator.id, request.admin_notes)
                .await?,
            "Model approved and published",
        ),
        ReviewAction::Reject => (
            service
                .reject(
                    &model_id,
                    &moderator.id,
                    request.rejection_reason.as_deref().unwrap_or_default(),
                    request.admin_notes,
                )
                .await?,
            "Model rejected",
        ),
    };

    Ok(Json(ReviewResponse {
        message: message.to_string(),
        model,
    }))
}
