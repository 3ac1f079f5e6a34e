//! In-memory hub used by unit tests
//!
//! Listings are page-numbered from 1 and report their last page, unless
//! registered as linked, in which case they hand out opaque URL cursors and
//! no page count. Failures are
//! injected per call key (`info:<id>`, `list:<author>:<page>`,
//! `discussions:<id>:<page>`, `messages:<id>:<num>`).

use crate::hub::{
    validate_account, validate_repo_id, DiscussionRef, HubApi, HubError, HubResult, ItemInfo,
    Page, PageCursor,
};
use crate::model::{Category, Platform};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) const ALWAYS: u32 = u32::MAX;

#[derive(Default)]
pub(crate) struct MockHub {
    items: HashMap<String, Vec<Vec<ItemInfo>>>,
    linked: HashSet<String>,
    infos: HashMap<String, ItemInfo>,
    discussions: HashMap<String, Vec<Vec<(u64, u64)>>>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl MockHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers an item for single lookups
    pub(crate) fn with_item(mut self, id: &str, downloads: u64, likes: u64) -> Self {
        self.infos.insert(
            id.to_string(),
            ItemInfo {
                id: id.to_string(),
                downloads,
                likes,
            },
        );
        self
    }

    /// Registers an account listing, one inner vec per page
    pub(crate) fn with_pages(mut self, author: &str, pages: Vec<Vec<&str>>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|id| ItemInfo {
                        id: id.to_string(),
                        downloads: 10,
                        likes: 1,
                    })
                    .collect()
            })
            .collect();
        self.items.insert(author.to_string(), pages);
        self
    }

    /// Registers an account listing paginated by URL cursors
    pub(crate) fn with_linked_pages(mut self, author: &str, pages: Vec<Vec<&str>>) -> Self {
        self.linked.insert(author.to_string());
        self.with_pages(author, pages)
    }

    /// Cursor URL of a linked listing page
    pub(crate) fn page_url(author: &str, number: u32) -> String {
        format!("https://hub.test/api/models?author={}&page={}", author, number)
    }

    /// Registers discussion pages as `(num, message_count)` pairs
    pub(crate) fn with_discussions(mut self, id: &str, pages: Vec<Vec<(u64, u64)>>) -> Self {
        self.discussions.insert(id.to_string(), pages);
        self
    }

    /// Makes the call identified by `key` fail transiently `times` times
    pub(crate) fn fail(self, key: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(key.to_string(), times);
        self
    }

    pub(crate) fn calls(&self, key: &str) -> u32 {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn enter(&self, key: String) -> HubResult<()> {
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&key) {
            Some(remaining) if *remaining > 0 => {
                if *remaining != ALWAYS {
                    *remaining -= 1;
                }
                Err(HubError::Api {
                    status: 503,
                    url: key,
                    message: "unavailable".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn page_number(cursor: Option<&PageCursor>) -> HubResult<u32> {
        match cursor {
            None => Ok(1),
            Some(PageCursor::Number(n)) => Ok(*n),
            Some(PageCursor::Url(url)) => url
                .rsplit_once("page=")
                .and_then(|(_, n)| n.parse().ok())
                .ok_or_else(|| HubError::InvalidInput(url.clone())),
        }
    }
}

#[async_trait]
impl HubApi for MockHub {
    fn platform(&self) -> Platform {
        Platform::Huggingface
    }

    fn item_link(&self, _category: Category, id: &str) -> String {
        format!("https://hub.test/{}", id)
    }

    async fn item_info(&self, _category: Category, id: &str) -> HubResult<ItemInfo> {
        validate_repo_id(id)?;
        self.enter(format!("info:{}", id))?;
        self.infos.get(id).cloned().ok_or_else(|| HubError::Api {
            status: 404,
            url: id.to_string(),
            message: "not found".to_string(),
        })
    }

    async fn list_items(
        &self,
        _category: Category,
        author: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<ItemInfo>> {
        validate_account(author)?;
        let number = Self::page_number(cursor)?;
        self.enter(format!("list:{}:{}", author, number))?;

        let pages = self.items.get(author).cloned().unwrap_or_default();
        let last = pages.len().max(1) as u32;
        let items = pages
            .get(number as usize - 1)
            .cloned()
            .unwrap_or_default();

        if self.linked.contains(author) {
            return Ok(Page {
                items,
                next: (number < last).then(|| PageCursor::Url(Self::page_url(author, number + 1))),
                last_page: None,
            });
        }
        Ok(Page {
            items,
            next: (number < last).then(|| PageCursor::Number(number + 1)),
            last_page: Some(last),
        })
    }

    async fn list_discussions(
        &self,
        _category: Category,
        id: &str,
        cursor: Option<&PageCursor>,
    ) -> HubResult<Page<DiscussionRef>> {
        validate_repo_id(id)?;
        let number = Self::page_number(cursor)?;
        self.enter(format!("discussions:{}:{}", id, number))?;

        let pages = self.discussions.get(id).cloned().unwrap_or_default();
        let last = pages.len().max(1) as u32;
        let items = pages
            .get(number as usize - 1)
            .map(|page| page.iter().map(|(num, _)| DiscussionRef { num: *num }).collect())
            .unwrap_or_default();
        Ok(Page {
            items,
            next: (number < last).then(|| PageCursor::Number(number + 1)),
            last_page: Some(last),
        })
    }

    async fn discussion_message_count(
        &self,
        _category: Category,
        id: &str,
        num: u64,
    ) -> HubResult<u64> {
        validate_repo_id(id)?;
        self.enter(format!("messages:{}:{}", id, num))?;
        Ok(self
            .discussions
            .get(id)
            .and_then(|pages| pages.iter().flatten().find(|(n, _)| *n == num))
            .map(|(_, messages)| *messages)
            .unwrap_or(0))
    }
}
