//! ModelScope client
//!
//! ModelScope paginates account listings by page number and reports a total
//! count, so a failed page can be skipped. It exposes no discussion API.

use crate::hub::client::{authorize, build_http_client, read_json, HubSettings};
use crate::hub::count::lenient;
use crate::hub::{
    validate_account, validate_repo_id, DiscussionRef, HubApi, HubError, HubResult, ItemInfo,
    Page, PageCursor,
};
use crate::model::{Category, Platform};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, url: &str) -> HubResult<T> {
        if self.success == Some(false) {
            return Err(HubError::Api {
                status: 200,
                url: url.to_string(),
                message: self.message.unwrap_or_default(),
            });
        }
        self.data
            .ok_or_else(|| HubError::Parse(format!("response from {} has no Data", url)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawModel {
    name: String,
    path: String,
    #[serde(default, deserialize_with = "lenient")]
    downloads: u64,
    #[serde(default, deserialize_with = "lenient")]
    stars: u64,
}

impl From<RawModel> for ItemInfo {
    fn from(raw: RawModel) -> Self {
        Self {
            id: format!("{}/{}", raw.path, raw.name),
            downloads: raw.downloads,
            likes: raw.stars,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawModelList {
    #[serde(default)]
    models: Vec<RawModel>,
    #[serde(default)]
    total_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListRequest<'a> {
    path: &'a str,
    page_number: u32,
    page_size: u32,
}

/// Client for the ModelScope REST API
pub struct ModelScopeClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    page_size: u32,
}

impl ModelScopeClient {
    pub fn new(settings: &HubSettings) -> HubResult<Self> {
        Ok(Self {
            client: build_http_client()?,
            endpoint: settings.endpoint_or(Platform::ModelScope.default_endpoint()),
            token: settings.token.clone(),
            page_size: settings.page_size,
        })
    }

    fn require_models(category: Category) -> HubResult<()> {
        match category {
            Category::Model => Ok(()),
            Category::Dataset => Err(HubError::InvalidInput(
                "ModelScope crawling supports models only".to_string(),
            )),
        }
    }
}

#[async_trait]
impl HubApi for ModelScopeClient {
    fn platform(&self) -> Platform {
        Platform::ModelScope
    }

    fn item_link(&self, _category: Category, id: &str) -> String {
        format!("{}/models/{}", self.endpoint, id)
    }

    async fn item_info(&self, category: Category, id: &str) -> HubResult<ItemInfo> {
        Self::require_models(category)?;
        validate_repo_id(id)?;
        let url = format!("{}/api/v1/models/{}", self.endpoint, id);
        let request = authorize(self.client.get(&url), self.token.as_deref());
        let envelope: Envelope<RawModel> = read_json(request.send().await?).await?;
        Ok(envelope.into_data(&url)?.into())
    }

    async fn list_items(
        &self,
        category: Category,
        author: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<ItemInfo>> {
        Self::require_models(category)?;
        validate_account(author)?;
        let page_number = match cursor {
            None => 1,
            Some(PageCursor::Number(n)) => *n,
            Some(PageCursor::Url(url)) => {
                return Err(HubError::InvalidInput(format!(
                    "model listings are page-numbered, got cursor {}",
                    url
                )))
            }
        };

        let url = format!("{}/api/v1/models", self.endpoint);
        let body = ListRequest {
            path: author,
            page_number,
            page_size: self.page_size,
        };
        let request = authorize(self.client.put(&url).json(&body), self.token.as_deref());
        let envelope: Envelope<RawModelList> = read_json(request.send().await?).await?;
        let list = envelope.into_data(&url)?;

        let page_size = u64::from(self.page_size.max(1));
        let last_page = list.total_count.div_ceil(page_size).max(1);
        let last_page = u32::try_from(last_page).unwrap_or(u32::MAX);
        let next = (page_number < last_page).then(|| PageCursor::Number(page_number + 1));

        Ok(Page {
            items: list.models.into_iter().map(ItemInfo::from).collect(),
            next,
            last_page: Some(last_page),
        })
    }

    fn has_discussions(&self) -> bool {
        false
    }

    async fn list_discussions(
        &self,
        _category: Category,
        _id: &str,
        _cursor: Option<&PageCursor>,
    ) -> HubResult<Page<DiscussionRef>> {
        Ok(Page::end())
    }

    async fn discussion_message_count(
        &self,
        _category: Category,
        _id: &str,
        _num: u64,
    ) -> HubResult<u64> {
        Ok(0)
    }
}
