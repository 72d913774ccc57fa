//! Review queue and browse query types
//!
//! Filters, sort orders and paging shared by the admin review queue and the
//! public feed.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::{ModelRecord, ModelStatus};
use super::user::AuthorSummary;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;
/// Deepest page a client may ask for; keeps OFFSET well inside i64
pub const MAX_PAGE: u64 = 10_000;

/// Which statuses the review queue shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    #[default]
    All,
    Verification,
    Published,
    Rejected,
}

impl ReviewFilter {
    /// `None` means no status restriction
    pub fn status(&self) -> Option<ModelStatus> {
        match self {
            ReviewFilter::All => None,
            ReviewFilter::Verification => Some(ModelStatus::Verification),
            ReviewFilter::Published => Some(ModelStatus::Published),
            ReviewFilter::Rejected => Some(ModelStatus::Rejected),
        }
    }

    pub fn matches(&self, record: &ModelRecord) -> bool {
        self.status().map_or(true, |s| record.status == s)
    }
}

impl std::str::FromStr for ReviewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ReviewFilter::All),
            "verification" => Ok(ReviewFilter::Verification),
            "published" => Ok(ReviewFilter::Published),
            "rejected" => Ok(ReviewFilter::Rejected),
            _ => Err(format!(
                "Unknown filter: {}. Use: all, verification, published, rejected",
                s
            )),
        }
    }
}

/// Ordering of the review queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    /// Category ascending, then newest first within a category
    Category,
}

impl ReviewSort {
    pub fn compare(&self, a: &ModelRecord, b: &ModelRecord) -> Ordering {
        match self {
            ReviewSort::Newest => b.created_at.cmp(&a.created_at),
            ReviewSort::Oldest => a.created_at.cmp(&b.created_at),
            ReviewSort::Category => a
                .content
                .category
                .cmp(&b.content.category)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl std::str::FromStr for ReviewSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(ReviewSort::Newest),
            "oldest" => Ok(ReviewSort::Oldest),
            "category" => Ok(ReviewSort::Category),
            _ => Err(format!(
                "Unknown sort: {}. Use: newest, oldest, category",
                s
            )),
        }
    }
}

/// 1-based page request with a bounded page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Clamp `page` to 1..=MAX_PAGE and `limit` to 1..=MAX_PAGE_LIMIT
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Dashboard counts over the whole table, independent of the active filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReviewStats {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

impl ReviewStats {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a ModelRecord>) -> Self {
        records
            .into_iter()
            .fold(ReviewStats::default(), |mut stats, record| {
                match record.status {
                    ModelStatus::Verification => stats.pending += 1,
                    ModelStatus::Published => stats.approved += 1,
                    ModelStatus::Rejected => stats.rejected += 1,
                }
                stats.total += 1;
                stats
            })
    }
}

/// A review-queue row: the record plus who submitted it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueItem {
    #[serde(flatten)]
    pub record: ModelRecord,
    /// `None` if the author row has disappeared
    pub author: Option<AuthorSummary>,
}

/// One page of the review queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub items: Vec<ReviewQueueItem>,
    pub stats: ReviewStats,
    pub page: u64,
    pub limit: u64,
    /// Records matching the filter across all pages
    pub total_matching: u64,
}

/// Public feed query
#[derive(Debug, Clone, Default)]
pub struct PublishedQuery {
    pub category: Option<String>,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
    pub include_nsfw: bool,
    pub page: PageRequest,
}

impl PublishedQuery {
    pub fn matches(&self, record: &ModelRecord) -> bool {
        if !record.is_publicly_visible() {
            return false;
        }
        if record.content.nsfw && !self.include_nsfw {
            return false;
        }
        if let Some(category) = &self.category {
            if record.content.category != *category {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let title = record.content.title.to_lowercase();
            let description = record.content.description.to_lowercase();
            if !title.contains(&needle) && !description.contains(&needle) {
                return false;
            }
        }
        true
    }
}
