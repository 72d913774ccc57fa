//! PostgreSQL adapter for ModelRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    License, ModelContent, ModelId, ModelRecord, ModelStatus, NewModelRecord, PageRequest,
    PublishedQuery, ReviewDecision, ReviewFilter, ReviewSort, ReviewStats, UserId, Visibility,
};
use crate::domain::ports::ModelRepository;
use crate::entity::models;
use crate::error::DomainError;

const DUPLICATE_TITLE: &str = "You already have a model with this title";
const REVIEWED_WHILE_EDITING: &str = "Model was reviewed while you were editing it";

/// PostgreSQL implementation of ModelRepository
pub struct PostgresModelRepository {
    db: DatabaseConnection,
}

impl PostgresModelRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct StatusCount {
    status: String,
    count: i64,
}

#[async_trait]
impl ModelRepository for PostgresModelRepository {
    async fn create(&self, model: &NewModelRecord) -> Result<ModelRecord, DomainError> {
        let now = Utc::now().fixed_offset();
        let content = &model.content;

        let active = models::ActiveModel {
            id: Set(Uuid::new_v4()),
            author_id: Set(model.author_id.0),
            title: Set(content.title.clone()),
            description: Set(content.description.clone()),
            category: Set(content.category.clone()),
            tags: Set(serde_json::Value::from(content.tags.clone())),
            visibility: Set(content.visibility.to_string()),
            nsfw: Set(content.nsfw),
            license_adaptations: Set(content.license.adaptations),
            license_commercial: Set(content.license.commercial_use),
            license_sharing: Set(content.license.sharing),
            community_post: Set(content.community_post),
            cover_image_url: Set(content.cover_image_url.clone()),
            gallery_image_urls: Set(serde_json::Value::from(content.gallery_image_urls.clone())),
            model_file_url: Set(content.model_file_url.clone()),
            status: Set(ModelStatus::Verification.to_string()),
            rejection_reason: Set(None),
            admin_notes: Set(None),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            published_at: Set(None),
            likes: Set(0),
            downloads: Set(0),
            views: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = active
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::from_db(e, DUPLICATE_TITLE))?;

        result.try_into()
    }

    async fn find_by_id(&self, id: &ModelId) -> Result<Option<ModelRecord>, DomainError> {
        let result = models::Entity::find_by_id(id.0).one(&self.db).await?;

        result.map(ModelRecord::try_from).transpose()
    }

    async fn title_taken(
        &self,
        author_id: &UserId,
        title: &str,
        except: Option<&ModelId>,
    ) -> Result<bool, DomainError> {
        let mut query = models::Entity::find()
            .filter(models::Column::AuthorId.eq(author_id.0))
            .filter(models::Column::Title.eq(title));
        if let Some(except) = except {
            query = query.filter(models::Column::Id.ne(except.0));
        }

        Ok(query.count(&self.db).await? > 0)
    }

    async fn update_content(
        &self,
        model: &ModelRecord,
        expected: ModelStatus,
    ) -> Result<(), DomainError> {
        let content = &model.content;

        let changes = models::ActiveModel {
            title: Set(content.title.clone()),
            description: Set(content.description.clone()),
            category: Set(content.category.clone()),
            tags: Set(serde_json::Value::from(content.tags.clone())),
            visibility: Set(content.visibility.to_string()),
            nsfw: Set(content.nsfw),
            license_adaptations: Set(content.license.adaptations),
            license_commercial: Set(content.license.commercial_use),
            license_sharing: Set(content.license.sharing),
            community_post: Set(content.community_post),
            cover_image_url: Set(content.cover_image_url.clone()),
            gallery_image_urls: Set(serde_json::Value::from(content.gallery_image_urls.clone())),
            model_file_url: Set(content.model_file_url.clone()),
            status: Set(model.status.to_string()),
            rejection_reason: Set(model.rejection_reason.clone()),
            updated_at: Set(model.updated_at.fixed_offset()),
            ..Default::default()
        };

        // Only lands if no review happened since the editor read the record
        let result = models::Entity::update_many()
            .set(changes)
            .filter(models::Column::Id.eq(model.id.0))
            .filter(models::Column::Status.eq(expected.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::from_db(e, DUPLICATE_TITLE))?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        match models::Entity::find_by_id(model.id.0).one(&self.db).await? {
            Some(_) => Err(DomainError::Conflict(REVIEWED_WHILE_EDITING.to_string())),
            None => Err(DomainError::NotFound(format!("Model {} not found", model.id))),
        }
    }

    async fn apply_review(
        &self,
        id: &ModelId,
        decision: &ReviewDecision,
        moderator: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ModelRecord>, DomainError> {
        // Single UPDATE ... RETURNING, so every disposition field lands together
        let result = models::ActiveModel {
            id: Set(id.0),
            status: Set(decision.status().to_string()),
            published_at: Set(decision.published_at(at).map(|t| t.fixed_offset())),
            rejection_reason: Set(decision.rejection_reason().map(str::to_string)),
            admin_notes: Set(decision.admin_notes().map(str::to_string)),
            reviewed_by: Set(Some(moderator.0)),
            reviewed_at: Set(Some(at.fixed_offset())),
            updated_at: Set(at.fixed_offset()),
            ..Default::default()
        }
        .update(&self.db)
        .await;

        match result {
            Ok(model) => model.try_into().map(Some),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_for_review(
        &self,
        filter: ReviewFilter,
        sort: ReviewSort,
        page: PageRequest,
    ) -> Result<(Vec<ModelRecord>, u64), DomainError> {
        let mut query = models::Entity::find();
        if let Some(status) = filter.status() {
            query = query.filter(models::Column::Status.eq(status.to_string()));
        }

        let total = query.clone().count(&self.db).await?;

        let query = match sort {
            ReviewSort::Newest => query.order_by_desc(models::Column::CreatedAt),
            ReviewSort::Oldest => query.order_by_asc(models::Column::CreatedAt),
            ReviewSort::Category => query
                .order_by_asc(models::Column::Category)
                .order_by_desc(models::Column::CreatedAt),
        };

        let results = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let records = results
            .into_iter()
            .map(ModelRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((records, total))
    }

    async fn review_stats(&self) -> Result<ReviewStats, DomainError> {
        let rows = models::Entity::find()
            .select_only()
            .column(models::Column::Status)
            .column_as(Expr::col(models::Column::Id).count(), "count")
            .group_by(models::Column::Status)
            .into_model::<StatusCount>()
            .all(&self.db)
            .await?;

        let mut stats = ReviewStats::default();
        for row in rows {
            let count = u64::try_from(row.count).unwrap_or(0);
            let status: ModelStatus = row.status.parse().map_err(DomainError::Internal)?;
            match status {
                ModelStatus::Verification => stats.pending += count,
                ModelStatus::Published => stats.approved += count,
                ModelStatus::Rejected => stats.rejected += count,
            }
            stats.total += count;
        }

        Ok(stats)
    }

    async fn list_published(
        &self,
        query: &PublishedQuery,
    ) -> Result<Vec<ModelRecord>, DomainError> {
        let mut select = models::Entity::find()
            .filter(models::Column::Status.eq(ModelStatus::Published.to_string()))
            .filter(models::Column::Visibility.eq(Visibility::Public.to_string()));

        if !query.include_nsfw {
            select = select.filter(models::Column::Nsfw.eq(false));
        }
        if let Some(category) = &query.category {
            select = select.filter(models::Column::Category.eq(category.as_str()));
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(models::Column::Title))).like(&pattern))
                    .add(
                        Expr::expr(Func::lower(Expr::col(models::Column::Description)))
                            .like(&pattern),
                    ),
            );
        }

        let results = select
            .order_by_desc(models::Column::PublishedAt)
            .order_by_desc(models::Column::CreatedAt)
            .offset(query.page.offset())
            .limit(query.page.limit())
            .all(&self.db)
            .await?;

        results.into_iter().map(ModelRecord::try_from).collect()
    }

    async fn find_by_author(
        &self,
        author_id: &UserId,
        page: PageRequest,
    ) -> Result<Vec<ModelRecord>, DomainError> {
        let results = models::Entity::find()
            .filter(models::Column::AuthorId.eq(author_id.0))
            .order_by_desc(models::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        results.into_iter().map(ModelRecord::try_from).collect()
    }

    async fn increment_views(&self, id: &ModelId) -> Result<(), DomainError> {
        models::Entity::update_many()
            .col_expr(
                models::Column::Views,
                Expr::col(models::Column::Views).add(1),
            )
            .filter(models::Column::Id.eq(id.0))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn json_strings(value: serde_json::Value, column: &str) -> Result<Vec<String>, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Internal(format!("Malformed {} column: {}", column, e)))
}

/// Convert SeaORM model to domain entity
impl TryFrom<models::Model> for ModelRecord {
    type Error = DomainError;

    fn try_from(model: models::Model) -> Result<Self, Self::Error> {
        Ok(ModelRecord {
            id: ModelId(model.id),
            author_id: UserId(model.author_id),
            content: ModelContent {
                title: model.title,
                description: model.description,
                category: model.category,
                tags: json_strings(model.tags, "tags")?,
                visibility: model.visibility.parse().map_err(DomainError::Internal)?,
                nsfw: model.nsfw,
                license: License {
                    adaptations: model.license_adaptations,
                    commercial_use: model.license_commercial,
                    sharing: model.license_sharing,
                },
                community_post: model.community_post,
                cover_image_url: model.cover_image_url,
                gallery_image_urls: json_strings(model.gallery_image_urls, "gallery_image_urls")?,
                model_file_url: model.model_file_url,
            },
            status: model.status.parse().map_err(DomainError::Internal)?,
            rejection_reason: model.rejection_reason,
            admin_notes: model.admin_notes,
            reviewed_by: model.reviewed_by.map(UserId),
            reviewed_at: model.reviewed_at.map(|t| t.with_timezone(&Utc)),
            published_at: model.published_at.map(|t| t.with_timezone(&Utc)),
            likes: model.likes,
            downloads: model.downloads,
            views: model.views,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
