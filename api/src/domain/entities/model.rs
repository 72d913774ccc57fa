//! Model record domain entity
//!
//! A submitted medical 3D model and its moderation lifecycle:
//! `verification` -> `published` | `rejected`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{AuthorSummary, UserId};
use crate::error::DomainError;

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MIN_LEN: usize = 10;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// Unique identifier for a model record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub Uuid);

impl ModelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ModelId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moderation status of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Waiting in the review queue
    Verification,
    /// Approved by a moderator
    Published,
    /// Turned down by a moderator; the author may edit and resubmit
    Rejected,
}

impl ModelStatus {
    /// Whether the author may still change the content fields
    pub fn is_editable(&self) -> bool {
        match self {
            ModelStatus::Verification | ModelStatus::Rejected => true,
            ModelStatus::Published => false,
        }
    }
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelStatus::Verification => write!(f, "verification"),
            ModelStatus::Published => write!(f, "published"),
            ModelStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ModelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verification" => Ok(ModelStatus::Verification),
            "published" => Ok(ModelStatus::Published),
            "rejected" => Ok(ModelStatus::Rejected),
            _ => Err(format!("Unknown model status: {}", s)),
        }
    }
}

/// Who can see a model once it is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Unknown visibility: {}", s)),
        }
    }
}

/// License terms chosen by the author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub adaptations: bool,
    pub commercial_use: bool,
    pub sharing: bool,
}

/// Author-controlled content of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelContent {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub license: License,
    #[serde(default)]
    pub community_post: bool,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub gallery_image_urls: Vec<String>,
    #[serde(default)]
    pub model_file_url: Option<String>,
}

impl ModelContent {
    /// Trim text fields, drop blank tags/urls and dedupe tags (first occurrence wins)
    pub fn normalized(self) -> Self {
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            tags,
            visibility: self.visibility,
            nsfw: self.nsfw,
            license: self.license,
            community_post: self.community_post,
            cover_image_url: non_blank(self.cover_image_url),
            gallery_image_urls: self
                .gallery_image_urls
                .into_iter()
                .filter_map(|url| non_blank(Some(url)))
                .collect(),
            model_file_url: non_blank(self.model_file_url),
        }
    }

    /// At least one of cover image, gallery image or model asset
    pub fn has_media(&self) -> bool {
        self.cover_image_url.is_some()
            || !self.gallery_image_urls.is_empty()
            || self.model_file_url.is_some()
    }

    /// Check submission constraints. Expects normalized content.
    pub fn validate(&self) -> Result<(), DomainError> {
        let title_len = self.title.chars().count();
        if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&title_len) {
            return Err(DomainError::Validation(format!(
                "Title must be between {} and {} characters",
                TITLE_MIN_LEN, TITLE_MAX_LEN
            )));
        }

        let description_len = self.description.chars().count();
        if !(DESCRIPTION_MIN_LEN..=DESCRIPTION_MAX_LEN).contains(&description_len) {
            return Err(DomainError::Validation(format!(
                "Description must be between {} and {} characters",
                DESCRIPTION_MIN_LEN, DESCRIPTION_MAX_LEN
            )));
        }

        if self.category.is_empty() {
            return Err(DomainError::Validation(
                "Category is required".to_string(),
            ));
        }

        if !self.has_media() {
            return Err(DomainError::Validation(
                "At least one of cover image, gallery image or model file is required".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Partial edit of a model's content; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelContentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub nsfw: Option<bool>,
    pub license: Option<License>,
    pub community_post: Option<bool>,
    /// `Some(None)` clears the cover image
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub cover_image_url: Option<Option<String>>,
    pub gallery_image_urls: Option<Vec<String>>,
    /// `Some(None)` clears the model file
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub model_file_url: Option<Option<String>>,
}

impl ModelContentUpdate {
    pub fn apply_to(self, current: &ModelContent) -> ModelContent {
        let current = current.clone();
        ModelContent {
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            category: self.category.unwrap_or(current.category),
            tags: self.tags.unwrap_or(current.tags),
            visibility: self.visibility.unwrap_or(current.visibility),
            nsfw: self.nsfw.unwrap_or(current.nsfw),
            license: self.license.unwrap_or(current.license),
            community_post: self.community_post.unwrap_or(current.community_post),
            cover_image_url: self.cover_image_url.unwrap_or(current.cover_image_url),
            gallery_image_urls: self.gallery_image_urls.unwrap_or(current.gallery_image_urls),
            model_file_url: self.model_file_url.unwrap_or(current.model_file_url),
        }
    }
}

/// Distinguishes an absent field from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// A moderator's disposition of a model
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Approve {
        admin_notes: Option<String>,
    },
    Reject {
        rejection_reason: String,
        admin_notes: Option<String>,
    },
}

impl ReviewDecision {
    /// Status the record ends up in
    pub fn status(&self) -> ModelStatus {
        match self {
            ReviewDecision::Approve { .. } => ModelStatus::Published,
            ReviewDecision::Reject { .. } => ModelStatus::Rejected,
        }
    }

    pub fn admin_notes(&self) -> Option<&str> {
        match self {
            ReviewDecision::Approve { admin_notes } | ReviewDecision::Reject { admin_notes, .. } => {
                admin_notes.as_deref()
            }
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            ReviewDecision::Approve { .. } => None,
            ReviewDecision::Reject {
                rejection_reason, ..
            } => Some(rejection_reason.as_str()),
        }
    }

    /// `publishedAt` after the decision is applied at `now`
    pub fn published_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ReviewDecision::Approve { .. } => Some(now),
            ReviewDecision::Reject { .. } => None,
        }
    }
}

/// Data needed to create a new model record
#[derive(Debug, Clone)]
pub struct NewModelRecord {
    pub author_id: UserId,
    pub content: ModelContent,
}

/// A submitted model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: ModelId,
    pub author_id: UserId,
    #[serde(flatten)]
    pub content: ModelContent,
    pub status: ModelStatus,
    /// Present iff status is `rejected`
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Present iff status is `published`
    pub published_at: Option<DateTime<Utc>>,
    pub likes: i64,
    pub downloads: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModelRecord {
    /// A fresh record in the review queue
    pub fn submitted(new: NewModelRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: ModelId::new(),
            author_id: new.author_id,
            content: new.content,
            status: ModelStatus::Verification,
            rejection_reason: None,
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            published_at: None,
            likes: 0,
            downloads: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.author_id == *user_id
    }

    /// Published and public: visible to everyone
    pub fn is_publicly_visible(&self) -> bool {
        self.status == ModelStatus::Published && self.content.visibility == Visibility::Public
    }

    /// Authors always see their own records; everyone else only public, published ones
    pub fn is_viewable_by(&self, viewer: Option<&UserId>) -> bool {
        self.is_publicly_visible() || viewer.is_some_and(|v| self.is_owned_by(v))
    }

    /// Apply a moderator's decision. Re-disposing an already reviewed record
    /// re-stamps the reviewer fields.
    pub fn apply_review(&mut self, decision: &ReviewDecision, moderator: UserId, now: DateTime<Utc>) {
        self.status = decision.status();
        self.published_at = decision.published_at(now);
        self.rejection_reason = decision.rejection_reason().map(str::to_string);
        self.admin_notes = decision.admin_notes().map(str::to_string);
        self.reviewed_by = Some(moderator);
        self.reviewed_at = Some(now);
        self.updated_at = now;
    }

    /// Replace content after an author edit; a rejected record goes back to the queue
    pub fn apply_content(&mut self, content: ModelContent, now: DateTime<Utc>) {
        self.content = content;
        if self.status == ModelStatus::Rejected {
            self.status = ModelStatus::Verification;
            self.rejection_reason = None;
        }
        self.updated_at = now;
    }

    /// The asset a download hands out, falling back to the cover image
    pub fn download_url(&self) -> Option<&str> {
        self.content
            .model_file_url
            .as_deref()
            .or(self.content.cover_image_url.as_deref())
    }

    /// Capabilities of `viewer` on this record, for display
    pub fn permissions_for(&self, viewer: Option<&UserId>) -> ModelPermissions {
        let is_owner = viewer.is_some_and(|v| self.is_owned_by(v));
        let public = self.is_publicly_visible();

        ModelPermissions {
            can_edit: is_owner && self.status.is_editable(),
            can_download: viewer.is_some() && public,
            can_like: viewer.is_some() && !is_owner && public,
            can_share: public,
            is_owner,
        }
    }
}

/// What the viewer is allowed to do with a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPermissions {
    pub can_edit: bool,
    pub can_download: bool,
    pub can_like: bool,
    pub can_share: bool,
    pub is_owner: bool,
}

/// A record shaped for display to a particular viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelView {
    #[serde(flatten)]
    pub record: ModelRecord,
    pub author: Option<AuthorSummary>,
    pub permissions: ModelPermissions,
    pub liked_by_viewer: bool,
}
