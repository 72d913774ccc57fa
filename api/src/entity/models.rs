use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub tags: Json,
    pub visibility: String,
    pub nsfw: bool,
    pub license_adaptations: bool,
    pub license_commercial: bool,
    pub license_sharing: bool,
    pub community_post: bool,
    pub cover_image_url: Option<String>,
    pub gallery_image_urls: Json,
    pub model_file_url: Option<String>,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub likes: i64,
    pub downloads: i64,
    pub views: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::model_likes::Entity")]
    ModelLikes,
    #[sea_orm(has_many = "super::model_downloads::Entity")]
    ModelDownloads,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::model_likes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelLikes.def()
    }
}

impl Related<super::model_downloads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelDownloads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
