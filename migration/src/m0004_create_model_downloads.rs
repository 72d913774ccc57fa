use sea_orm_migration::prelude::*;

use crate::m0001_create_users::Users;
use crate::m0002_create_models::Models;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModelDownloads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelDownloads::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModelDownloads::UserId).uuid().not_null())
                    .col(ColumnDef::new(ModelDownloads::ModelId).uuid().not_null())
                    .col(ColumnDef::new(ModelDownloads::Source).string().null())
                    .col(
                        ColumnDef::new(ModelDownloads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_downloads_user_id")
                            .from(ModelDownloads::Table, ModelDownloads::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_downloads_model_id")
                            .from(ModelDownloads::Table, ModelDownloads::ModelId)
                            .to(Models::Table, Models::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_model_downloads_user_model_created_at")
                    .table(ModelDownloads::Table)
                    .col(ModelDownloads::UserId)
                    .col(ModelDownloads::ModelId)
                    .col(ModelDownloads::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_model_downloads_user_model_created_at")
                    .table(ModelDownloads::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ModelDownloads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ModelDownloads {
    Table,
    Id,
    UserId,
    ModelId,
    Source,
    CreatedAt,
}
