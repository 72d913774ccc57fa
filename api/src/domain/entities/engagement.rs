//! Engagement domain entities
//!
//! Likes are edges between a user and a model; the `likes` counter on the
//! model is a cache of the edge count. Downloads are an append-only event log
//! consulted only to debounce repeat downloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::model::ModelId;
use super::user::UserId;

/// Engagement action requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementAction {
    Like,
    Unlike,
    Download,
}

/// A counted download, appended to the event log
#[derive(Debug, Clone)]
pub struct NewDownloadEvent {
    pub user_id: UserId,
    pub model_id: ModelId,
    pub source: Option<String>,
    pub at: DateTime<Utc>,
}

/// Result of a like or unlike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub likes: i64,
}

/// Result of a download request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadOutcome {
    pub downloads: i64,
    /// False when the download fell inside the debounce window
    pub counted: bool,
    pub download_url: Option<String>,
}

/// Repeat downloads by the same user inside `window` are not counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadDebounce {
    window: Duration,
}

impl DownloadDebounce {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Seconds outside chrono's range fall back to the default window
    pub fn from_secs(secs: i64) -> Self {
        Duration::try_seconds(secs)
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Whether a download at `now` counts given the user's previous counted download
    pub fn should_count(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            None => true,
            Some(last) => now - last >= self.window,
        }
    }
}

impl Default for DownloadDebounce {
    fn default() -> Self {
        Self::new(Duration::seconds(crate::config::DEFAULT_DOWNLOAD_DEBOUNCE_SECS))
    }
}
