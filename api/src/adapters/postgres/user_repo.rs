//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::domain::entities::{NewUser, User, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0).one(&self.db).await?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await?;

        results.into_iter().map(User::try_from).collect()
    }

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::ApiKeyHash.eq(hash))
            .one(&self.db)
            .await?;

        result.map(User::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(users::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        result.map(User::try_from).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name.clone()),
            api_key_hash: Set(user.api_key_hash.clone()),
            role: Set(user.role.to_string()),
            created_at: Set(now),
            last_seen_at: Set(None),
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            DomainError::from_db(e, &format!("User with name '{}' already exists", user.name))
        })?;

        result.try_into()
    }

    async fn update_last_seen(&self, id: &UserId) -> Result<(), DomainError> {
        let now = Utc::now().fixed_offset();

        users::ActiveModel {
            id: Set(id.0),
            last_seen_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<users::Model> for User {
    type Error = DomainError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(model.id),
            name: model.name,
            api_key_hash: model.api_key_hash,
            role: model.role.parse().map_err(DomainError::Internal)?,
            created_at: model.created_at.with_timezone(&Utc),
            last_seen_at: model.last_seen_at.map(|t| t.with_timezone(&Utc)),
        })
    }
}
