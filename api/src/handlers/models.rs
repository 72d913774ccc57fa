//! Model handlers
//!
//! Submission, editing, browsing, detail views and engagement.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{
    EngagementAction, ModelContent, ModelContentUpdate, ModelId, ModelRecord, ModelStatus,
    ModelView, PageRequest, PublishedQuery, User,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for the public feed
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsQuery {
    pub category: Option<String>,
    /// Case-insensitive search over title and description
    pub q: Option<String>,
    #[serde(default)]
    pub include_nsfw: bool,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListModelsQuery {
    fn into_published_query(self) -> PublishedQuery {
        PublishedQuery {
            category: non_empty(self.category),
            search: non_empty(self.q),
            include_nsfw: self.include_nsfw,
            page: PageRequest::new(self.page, self.limit),
        }
    }
}

/// Paging query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A page of model records
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListResponse {
    pub items: Vec<ModelRecord>,
    pub page: u64,
    pub limit: u64,
}

/// Response for a new submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub id: String,
    pub status: ModelStatus,
    pub message: String,
}

/// Free-form client metadata attached to an engagement
#[derive(Debug, Default, Deserialize)]
pub struct EngageMetadata {
    /// Provenance tag, recorded as-is
    pub source: Option<String>,
}

/// Request body for POST /models/:id/engage
#[derive(Debug, Deserialize)]
pub struct EngageRequest {
    pub action: EngagementAction,
    #[serde(default)]
    pub metadata: Option<EngageMetadata>,
}

/// Response for an engagement action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngageResponse {
    pub action: EngagementAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /models
///
/// Browse published, public models.
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListModelsQuery>,
) -> Result<Json<ModelListResponse>, AppError> {
    let query = query.into_published_query();
    let items = state.moderation_service.list_published(&query).await?;

    Ok(Json(ModelListResponse {
        items,
        page: query.page.page(),
        limit: query.page.limit(),
    }))
}

/// GET /models/:id
///
/// Model detail with the viewer's permissions. Counts a view.
pub async fn get_model(
    State(state): State<AppState>,
    user: Option<Extension<User>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ModelView>, AppError> {
    let viewer = user.as_ref().map(|Extension(u)| &u.id);
    let view = state.moderation_service.view(&ModelId(id), viewer).await?;

    Ok(Json(view))
}

/// POST /models
///
/// Submit a model for review.
pub async fn submit_model(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(content): Json<ModelContent>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let record = state.moderation_service.submit(&user.id, content).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: record.id.to_string(),
            status: record.status,
            message: "Model submitted and awaiting review".to_string(),
        }),
    ))
}

/// GET /models/mine
///
/// The caller's own models in every status.
pub async fn list_my_models(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ModelListResponse>, AppError> {
    let page = PageRequest::new(query.page, query.limit);
    let items = state.moderation_service.list_mine(&user.id, page).await?;

    Ok(Json(ModelListResponse {
        items,
        page: page.page(),
        limit: page.limit(),
    }))
}

/// PATCH /models/:id
///
/// Edit a model still in review or rejected. Editing a rejected model resubmits it.
pub async fn update_model(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ModelContentUpdate>,
) -> Result<Json<ModelRecord>, AppError> {
    let record = state
        .moderation_service
        .update(&ModelId(id), &user.id, patch)
        .await?;

    Ok(Json(record))
}

/// POST /models/:id/engage
///
/// Like, unlike or download a model.
pub async fn engage_model(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<EngageRequest>,
) -> Result<Json<EngageResponse>, AppError> {
    let model_id = ModelId(id);
    let service = &state.engagement_service;

    let response = match request.action {
        EngagementAction::Like => {
            let outcome = service.like(&model_id, &user.id).await?;
            EngageResponse::likes(request.action, outcome.likes, true)
        }
        EngagementAction::Unlike => {
            let outcome = service.unlike(&model_id, &user.id).await?;
            EngageResponse::likes(request.action, outcome.likes, false)
        }
        EngagementAction::Download => {
            let source = request.metadata.and_then(|m| m.source);
            let outcome = service.download(&model_id, &user.id, source).await?;
            EngageResponse {
                action: request.action,
                likes: None,
                liked: None,
                downloads: Some(outcome.downloads),
                counted: Some(outcome.counted),
                download_url: outcome.download_url,
            }
        }
    };

    Ok(Json(response))
}

impl EngageResponse {
    fn likes(action: EngagementAction, likes: i64, liked: bool) -> Self {
        Self {
            action,
            likes: Some(likes),
            liked: Some(liked),
            downloads: None,
            counted: None,
            download_url: None,
        }
    }
}
