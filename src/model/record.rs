//! Per-item crawl outcome records
//!
//! A `FetchResult` is serialized flat, one JSON object per line. Success records
//! carry the stats fields with `error = null`; failure records carry `error`
//! and leave the stats null.

use crate::model::Category;
use serde::{Deserialize, Serialize};

/// Popularity metadata for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStats {
    pub downloads: u64,
    pub likes: u64,
    /// `None` on platforms without a discussion API
    pub discussion_count: Option<u64>,
    pub discussion_message_count: Option<u64>,
    pub link: String,
}

/// One item's crawl outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub repo: String,
    pub name: String,
    pub category: Category,
    pub date_crawl: String,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub discussion_count: Option<u64>,
    #[serde(default)]
    pub discussion_message_count: Option<u64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Pagination cursor of a failed page-advance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl FetchResult {
    pub fn success(
        repo: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        date_crawl: impl Into<String>,
        stats: ItemStats,
    ) -> Self {
        Self {
            repo: repo.into(),
            name: name.into(),
            category,
            date_crawl: date_crawl.into(),
            downloads: Some(stats.downloads),
            likes: Some(stats.likes),
            discussion_count: stats.discussion_count,
            discussion_message_count: stats.discussion_message_count,
            link: Some(stats.link),
            error: None,
            page: None,
        }
    }

    pub fn failure(
        repo: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        date_crawl: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            name: name.into(),
            category,
            date_crawl: date_crawl.into(),
            downloads: None,
            likes: None,
            discussion_count: None,
            discussion_message_count: None,
            link: None,
            error: Some(error.into()),
            page: None,
        }
    }

    /// Attaches the cursor of the page-advance that failed
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the stats payload for success records
    pub fn stats(&self) -> Option<ItemStats> {
        if self.is_error() {
            return None;
        }
        Some(ItemStats {
            downloads: self.downloads?,
            likes: self.likes?,
            discussion_count: self.discussion_count,
            discussion_message_count: self.discussion_message_count,
            link: self.link.clone()?,
        })
    }
}

/// Returns today's local date as `YYYY-MM-DD`
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
