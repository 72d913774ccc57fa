use sea_orm_migration::prelude::*;

use crate::m0001_create_users::Users;
use crate::m0002_create_models::Models;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The composite primary key is what rejects a second concurrent like
        // from the same user.
        manager
            .create_table(
                Table::create()
                    .table(ModelLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ModelLikes::UserId).uuid().not_null())
                    .col(ColumnDef::new(ModelLikes::ModelId).uuid().not_null())
                    .col(
                        ColumnDef::new(ModelLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_model_likes")
                            .col(ModelLikes::UserId)
                            .col(ModelLikes::ModelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_likes_user_id")
                            .from(ModelLikes::Table, ModelLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_likes_model_id")
                            .from(ModelLikes::Table, ModelLikes::ModelId)
                            .to(Models::Table, Models::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_model_likes_model_id")
                    .table(ModelLikes::Table)
                    .col(ModelLikes::ModelId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModelLikes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ModelLikes {
    Table,
    UserId,
    ModelId,
    CreatedAt,
}
