//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    License, ModelContent, ModelId, ModelRecord, ModelStatus, User, UserId, UserRole, Visibility,
};

/// Create a test user with default values
pub fn test_user() -> User {
    test_user_named("test-user")
}

/// Create a test user with a specific name
pub fn test_user_named(name: &str) -> User {
    User {
        id: UserId(Uuid::new_v4()),
        name: name.to_string(),
        api_key_hash: format!("hash-{}", name),
        role: UserRole::User,
        created_at: Utc::now(),
        last_seen_at: None,
    }
}

/// Create a test moderator
pub fn test_admin() -> User {
    User {
        role: UserRole::Admin,
        ..test_user_named("test-admin")
    }
}

/// Valid submission content for a heart model
pub fn test_content() -> ModelContent {
    test_content_titled("Heart Model")
}

/// Valid submission content with a specific title
pub fn test_content_titled(title: &str) -> ModelContent {
    ModelContent {
        title: title.to_string(),
        description: "Detailed anatomical model of the human heart".to_string(),
        category: "cardiology".to_string(),
        tags: vec!["heart".to_string(), "anatomy".to_string()],
        visibility: Visibility::Public,
        nsfw: false,
        license: License {
            adaptations: true,
            commercial_use: false,
            sharing: true,
        },
        community_post: false,
        cover_image_url: Some("https://cdn.test/heart/cover.png".to_string()),
        gallery_image_urls: vec![],
        model_file_url: Some("https://cdn.test/heart/model.stl".to_string()),
    }
}

/// A record awaiting review
pub fn test_model(author_id: UserId) -> ModelRecord {
    test_model_with_status(author_id, ModelStatus::Verification)
}

/// A record in a specific status with the matching disposition fields set
pub fn test_model_with_status(author_id: UserId, status: ModelStatus) -> ModelRecord {
    let now = Utc::now();
    ModelRecord {
        id: ModelId(Uuid::new_v4()),
        author_id,
        content: test_content(),
        status,
        rejection_reason: (status == ModelStatus::Rejected)
            .then(|| "Mesh is not watertight".to_string()),
        admin_notes: None,
        reviewed_by: None,
        reviewed_at: None,
        published_at: (status == ModelStatus::Published).then_some(now),
        likes: 0,
        downloads: 0,
        views: 0,
        created_at: now,
        updated_at: now,
    }
}

/// A published, public record
pub fn test_published_model(author_id: UserId) -> ModelRecord {
    test_model_with_status(author_id, ModelStatus::Published)
}

/// A record created at a specific instant, for ordering tests
pub fn test_model_created_at(
    author_id: UserId,
    title: &str,
    category: &str,
    created_at: DateTime<Utc>,
) -> ModelRecord {
    let mut model = test_model(author_id);
    model.content.title = title.to_string();
    model.content.category = category.to_string();
    model.created_at = created_at;
    model.updated_at = created_at;
    model
}
