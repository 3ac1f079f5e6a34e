//! Remote hub capability layer
//!
//! The crawl core only talks to a hub through the [`HubApi`] trait:
//! single-item lookup, paginated enumeration of an account's items, paginated
//! enumeration of an item's discussions, and a discussion's message count.
//! One implementation exists per [`Platform`]; [`connect`] picks it.

mod client;
mod count;
mod huggingface;
mod modelscope;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{build_http_client, HubSettings};
pub use count::parse_count;
pub use huggingface::HuggingfaceClient;
pub use modelscope::ModelScopeClient;

use crate::model::{Category, Platform};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors returned by hub clients
#[derive(Debug, Error)]
pub enum HubError {
    /// Malformed identifier or argument; retrying cannot help
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}) for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl HubError {
    /// Everything except input validation is worth another attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidInput(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api { status: 429, .. })
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HubError::Parse(err.to_string())
        } else {
            HubError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Parse(err.to_string())
    }
}

/// Result type for hub operations
pub type HubResult<T> = Result<T, HubError>;

/// Position of a page within a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// Page-number pagination; any page can be requested directly
    Number(u32),
    /// Opaque next-page URL handed out by the previous page
    Url(String),
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "page {}", n),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the following page; `None` once the listing is exhausted
    pub next: Option<PageCursor>,
    /// Number of the final page, when the platform reports totals
    pub last_page: Option<u32>,
}

impl<T> Page<T> {
    /// An empty, final page
    pub fn end() -> Self {
        Self {
            items: Vec::new(),
            next: None,
            last_page: None,
        }
    }
}

/// Core metadata of one model or dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    /// Full identifier, `repo/name`
    pub id: String,
    pub downloads: u64,
    pub likes: u64,
}

impl ItemInfo {
    /// Item name without the account prefix
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Reference to a discussion thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscussionRef {
    pub num: u64,
}

/// Capabilities the crawl core needs from a remote hub
///
/// `cursor = None` requests the first page of a listing.
#[async_trait]
pub trait HubApi: Send + Sync {
    fn platform(&self) -> Platform;

    /// Canonical web link of an item
    fn item_link(&self, category: Category, id: &str) -> String;

    /// Looks up one item's core metadata
    async fn item_info(&self, category: Category, id: &str) -> HubResult<ItemInfo>;

    /// Fetches one page of the items published by `author`
    async fn list_items(
        &self,
        category: Category,
        author: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<ItemInfo>>;

    /// Whether the platform exposes discussion threads at all
    fn has_discussions(&self) -> bool {
        true
    }

    /// Fetches one page of an item's discussion threads
    async fn list_discussions(
        &self,
        category: Category,
        id: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<DiscussionRef>>;

    /// Number of messages (events) in one discussion thread
    async fn discussion_message_count(
        &self,
        category: Category,
        id: &str,
        num: u64,
    ) -> HubResult<u64>;
}

/// Builds the hub client for `platform`
pub fn connect(platform: Platform, settings: &HubSettings) -> HubResult<Box<dyn HubApi>> {
    let client: Box<dyn HubApi> = match platform {
        Platform::Huggingface => Box::new(HuggingfaceClient::new(settings)?),
        Platform::ModelScope => Box::new(ModelScopeClient::new(settings)?),
    };
    Ok(client)
}

/// Longest namespace or item name the hubs accept
const MAX_NAME_LEN: usize = 96;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

/// Validates an account name
pub fn validate_account(account: &str) -> HubResult<()> {
    if account.is_empty() || !account.chars().all(is_name_char) {
        return Err(HubError::InvalidInput(format!(
            "account '{}' must be non-empty and use only [A-Za-z0-9_.-]",
            account
        )));
    }
    if account.len() > MAX_NAME_LEN {
        return Err(HubError::InvalidInput(format!(
            "'{}' is longer than {} characters",
            account, MAX_NAME_LEN
        )));
    }
    if account.contains("--") || account.contains("..") {
        return Err(HubError::InvalidInput(format!(
            "account '{}' cannot contain '--' or '..'",
            account
        )));
    }
    Ok(())
}

/// Validates a `repo/name` identifier
///
/// The length limit applies to each part on its own.
pub fn validate_repo_id(id: &str) -> HubResult<()> {
    let mut parts = id.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(repo), Some(name), None) => {
            validate_account(repo)?;
            validate_account(name).map_err(|e| {
                HubError::InvalidInput(format!("item name in '{}' is malformed: {}", id, e))
            })
        }
        _ => Err(HubError::InvalidInput(format!(
            "identifier '{}' must look like <repo>/<name>",
            id
        ))),
    }
}
