use sea_orm_migration::prelude::*;

use crate::m0001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Models::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Models::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Models::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Models::Title).string_len(100).not_null())
                    .col(ColumnDef::new(Models::Description).text().not_null())
                    .col(ColumnDef::new(Models::Category).string().not_null())
                    .col(ColumnDef::new(Models::Tags).json().not_null())
                    .col(
                        ColumnDef::new(Models::Visibility)
                            .string()
                            .not_null()
                            .default("public"),
                    )
                    .col(
                        ColumnDef::new(Models::Nsfw)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Models::LicenseAdaptations)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Models::LicenseCommercial)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Models::LicenseSharing)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Models::CommunityPost)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Models::CoverImageUrl).string().null())
                    .col(ColumnDef::new(Models::GalleryImageUrls).json().not_null())
                    .col(ColumnDef::new(Models::ModelFileUrl).string().null())
                    .col(
                        ColumnDef::new(Models::Status)
                            .string()
                            .not_null()
                            .default("verification"),
                    )
                    .col(ColumnDef::new(Models::RejectionReason).text().null())
                    .col(ColumnDef::new(Models::AdminNotes).text().null())
                    .col(ColumnDef::new(Models::ReviewedBy).uuid().null())
                    .col(
                        ColumnDef::new(Models::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Models::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Models::Likes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Models::Downloads)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Models::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Models::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Models::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_models_author_id")
                            .from(Models::Table, Models::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_models_author_title_unique")
                            .table(Models::Table)
                            .col(Models::AuthorId)
                            .col(Models::Title)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_models_status_created_at")
                    .table(Models::Table)
                    .col(Models::Status)
                    .col(Models::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_models_published_at")
                    .table(Models::Table)
                    .col(Models::PublishedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_models_published_at")
                    .table(Models::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_models_status_created_at")
                    .table(Models::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Models::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Models {
    Table,
    Id,
    AuthorId,
    Title,
    Description,
    Category,
    Tags,
    Visibility,
    Nsfw,
    LicenseAdaptations,
    LicenseCommercial,
    LicenseSharing,
    CommunityPost,
    CoverImageUrl,
    GalleryImageUrls,
    ModelFileUrl,
    Status,
    RejectionReason,
    AdminNotes,
    ReviewedBy,
    ReviewedAt,
    PublishedAt,
    Likes,
    Downloads,
    Views,
    CreatedAt,
    UpdatedAt,
}
