//! Hugging Face Hub client
//!
//! Item listings follow the `Link: <...>; rel="next"` cursor header. Discussion
//! listings are numbered pages (`?p=N`) reporting a total `count`.

use crate::hub::client::{authorize, build_http_client, check_status, read_json, HubSettings};
use crate::hub::count::lenient;
use crate::hub::{
    validate_account, validate_repo_id, DiscussionRef, HubApi, HubError, HubResult, ItemInfo,
    Page, PageCursor,
};
use crate::model::{Category, Platform};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    #[serde(default, deserialize_with = "lenient")]
    downloads: u64,
    #[serde(default, deserialize_with = "lenient")]
    likes: u64,
}

impl From<RawItem> for ItemInfo {
    fn from(raw: RawItem) -> Self {
        Self {
            id: raw.id,
            downloads: raw.downloads,
            likes: raw.likes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDiscussionPage {
    #[serde(default)]
    discussions: Vec<RawDiscussion>,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    start: u64,
}

#[derive(Debug, Deserialize)]
struct RawDiscussion {
    num: u64,
}

#[derive(Debug, Deserialize)]
struct RawDiscussionDetails {
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

/// Client for the Hugging Face Hub REST API
pub struct HuggingfaceClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    page_size: u32,
}

impl HuggingfaceClient {
    pub fn new(settings: &HubSettings) -> HubResult<Self> {
        Ok(Self {
            client: build_http_client()?,
            endpoint: settings.endpoint_or(Platform::Huggingface.default_endpoint()),
            token: settings.token.clone(),
            page_size: settings.page_size,
        })
    }

    fn api_kind(category: Category) -> &'static str {
        match category {
            Category::Model => "models",
            Category::Dataset => "datasets",
        }
    }

    async fn get(&self, url: &str) -> HubResult<reqwest::Response> {
        let request = authorize(self.client.get(url), self.token.as_deref());
        let response = request.send().await?;
        check_status(response).await
    }
}

#[async_trait]
impl HubApi for HuggingfaceClient {
    fn platform(&self) -> Platform {
        Platform::Huggingface
    }

    fn item_link(&self, category: Category, id: &str) -> String {
        match category {
            Category::Model => format!("{}/{}", self.endpoint, id),
            Category::Dataset => format!("{}/datasets/{}", self.endpoint, id),
        }
    }

    async fn item_info(&self, category: Category, id: &str) -> HubResult<ItemInfo> {
        validate_repo_id(id)?;
        let url = format!("{}/api/{}/{}", self.endpoint, Self::api_kind(category), id);
        let raw: RawItem = read_json(self.get(&url).await?).await?;
        Ok(raw.into())
    }

    async fn list_items(
        &self,
        category: Category,
        author: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<ItemInfo>> {
        validate_account(author)?;
        let url = match cursor {
            None => format!(
                "{}/api/{}?author={}&full=true&limit={}",
                self.endpoint,
                Self::api_kind(category),
                author,
                self.page_size
            ),
            Some(PageCursor::Url(url)) => url.clone(),
            Some(PageCursor::Number(n)) => {
                return Err(HubError::InvalidInput(format!(
                    "item listings are cursor-paginated, got page number {}",
                    n
                )))
            }
        };

        let response = self.get(&url).await?;
        let next = next_link(response.headers()).map(PageCursor::Url);
        let body = response.text().await?;
        let raw: Vec<RawItem> = serde_json::from_str(&body)?;

        Ok(Page {
            items: raw.into_iter().map(ItemInfo::from).collect(),
            next,
            last_page: None,
        })
    }

    async fn list_discussions(
        &self,
        category: Category,
        id: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<DiscussionRef>> {
        validate_repo_id(id)?;
        let page = match cursor {
            None => 0,
            Some(PageCursor::Number(n)) => *n,
            Some(PageCursor::Url(url)) => {
                return Err(HubError::InvalidInput(format!(
                    "discussion listings are page-numbered, got cursor {}",
                    url
                )))
            }
        };

        let url = format!(
            "{}/api/{}/{}/discussions?p={}",
            self.endpoint,
            Self::api_kind(category),
            id,
            page
        );
        let raw: RawDiscussionPage = read_json(self.get(&url).await?).await?;

        let seen = raw.start + raw.discussions.len() as u64;
        let next = if !raw.discussions.is_empty() && seen < raw.count {
            Some(PageCursor::Number(page + 1))
        } else {
            None
        };

        Ok(Page {
            items: raw
                .discussions
                .into_iter()
                .map(|d| DiscussionRef { num: d.num })
                .collect(),
            next,
            last_page: None,
        })
    }

    async fn discussion_message_count(
        &self,
        category: Category,
        id: &str,
        num: u64,
    ) -> HubResult<u64> {
        validate_repo_id(id)?;
        let url = format!(
            "{}/api/{}/{}/discussions/{}",
            self.endpoint,
            Self::api_kind(category),
            id,
            num
        );
        let raw: RawDiscussionDetails = read_json(self.get(&url).await?).await?;
        Ok(raw.events.len() as u64)
    }
}

/// Extracts the `rel="next"` target from a `Link` header
fn next_link(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(LINK)?.to_str().ok()?;
    value.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.contains("rel=\"next\"") {
            return None;
        }
        let target = target.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        Some(target.to_string())
    })
}
