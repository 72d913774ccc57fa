//! PostgreSQL adapter for EngagementRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{LikeOutcome, ModelId, NewDownloadEvent, UserId};
use crate::domain::ports::EngagementRepository;
use crate::entity::{model_downloads, model_likes, models};
use crate::error::DomainError;

/// PostgreSQL implementation of EngagementRepository
pub struct PostgresEngagementRepository {
    db: DatabaseConnection,
}

impl PostgresEngagementRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_not_found(model_id: &ModelId) -> DomainError {
    DomainError::NotFound(format!("Model {} not found", model_id))
}

/// Read a single counter column off the model row
async fn read_counter<C: ConnectionTrait>(
    conn: &C,
    model_id: &ModelId,
    column: models::Column,
) -> Result<i64, DomainError> {
    models::Entity::find_by_id(model_id.0)
        .select_only()
        .column(column)
        .into_tuple::<i64>()
        .one(conn)
        .await?
        .ok_or_else(|| model_not_found(model_id))
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn has_liked(&self, user_id: &UserId, model_id: &ModelId) -> Result<bool, DomainError> {
        let result = model_likes::Entity::find_by_id((user_id.0, model_id.0))
            .one(&self.db)
            .await?;

        Ok(result.is_some())
    }

    async fn like(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<LikeOutcome, DomainError> {
        let txn = self.db.begin().await?;

        // The primary key on (user_id, model_id) arbitrates concurrent likes
        model_likes::ActiveModel {
            user_id: Set(user_id.0),
            model_id: Set(model_id.0),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await
        .map_err(|e| DomainError::from_db(e, "Model already liked"))?;

        let updated = models::Entity::update_many()
            .col_expr(
                models::Column::Likes,
                Expr::col(models::Column::Likes).add(1),
            )
            .filter(models::Column::Id.eq(model_id.0))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Err(model_not_found(model_id));
        }

        let likes = read_counter(&txn, model_id, models::Column::Likes).await?;
        txn.commit().await?;

        Ok(LikeOutcome { likes })
    }

    async fn unlike(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let txn = self.db.begin().await?;

        let deleted = model_likes::Entity::delete_many()
            .filter(model_likes::Column::UserId.eq(user_id.0))
            .filter(model_likes::Column::ModelId.eq(model_id.0))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        models::Entity::update_many()
            .col_expr(
                models::Column::Likes,
                Expr::cust("GREATEST(\"likes\" - 1, 0)"),
            )
            .filter(models::Column::Id.eq(model_id.0))
            .exec(&txn)
            .await?;

        let likes = read_counter(&txn, model_id, models::Column::Likes).await?;
        txn.commit().await?;

        Ok(Some(LikeOutcome { likes }))
    }

    async fn count_likes(&self, model_id: &ModelId) -> Result<u64, DomainError> {
        let count = model_likes::Entity::find()
            .filter(model_likes::Column::ModelId.eq(model_id.0))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn latest_download(
        &self,
        user_id: &UserId,
        model_id: &ModelId,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        let result = model_downloads::Entity::find()
            .filter(model_downloads::Column::UserId.eq(user_id.0))
            .filter(model_downloads::Column::ModelId.eq(model_id.0))
            .order_by_desc(model_downloads::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(result.map(|event| event.created_at.with_timezone(&Utc)))
    }

    async fn record_download(&self, event: &NewDownloadEvent) -> Result<i64, DomainError> {
        let txn = self.db.begin().await?;

        model_downloads::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(event.user_id.0),
            model_id: Set(event.model_id.0),
            source: Set(event.source.clone()),
            created_at: Set(event.at.fixed_offset()),
        }
        .insert(&txn)
        .await?;

        let updated = models::Entity::update_many()
            .col_expr(
                models::Column::Downloads,
                Expr::col(models::Column::Downloads).add(1),
            )
            .filter(models::Column::Id.eq(event.model_id.0))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Err(model_not_found(&event.model_id));
        }

        let downloads = read_counter(&txn, &event.model_id, models::Column::Downloads).await?;
        txn.commit().await?;

        Ok(downloads)
    }
}
