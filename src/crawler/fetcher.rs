//! Fetch engine
//!
//! Turns one [`Source`] into a lazy stream of [`FetchResult`]s:
//! - single-item mode looks up the item, then counts its discussions
//! - enumerate-all mode pages through the account's listing and counts
//!   discussions for each item it finds
//!
//! Every remote call is wrapped in the [`RetryPolicy`] on its own. Remote
//! failures that survive the retries become failure records; only
//! input-validation errors end the stream with `Err`.

use crate::crawler::retry::RetryPolicy;
use crate::hub::{HubApi, HubError, HubResult, ItemInfo, PageCursor};
use crate::model::{today, Category, FetchResult, ItemStats, Source};
use async_stream::try_stream;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Fetches item metadata from one hub with per-call retries
#[derive(Clone)]
pub struct FetchEngine {
    hub: Arc<dyn HubApi>,
    retry: RetryPolicy,
}

impl FetchEngine {
    pub fn new(hub: Arc<dyn HubApi>, retry: RetryPolicy) -> Self {
        Self { hub, retry }
    }

    /// Streams the results for `source`
    ///
    /// The stream is finite and can only be consumed once. Results become
    /// available as soon as their page has been fetched.
    pub fn fetch(&self, source: Source) -> BoxStream<'_, HubResult<FetchResult>> {
        Box::pin(try_stream! {
            let date = today();
            let category = source.category;

            match source.name.clone() {
                Some(name) => {
                    let id = format!("{}/{}", source.repo, name);
                    match self.fetch_single(category, &id).await {
                        Ok(stats) => {
                            yield FetchResult::success(&source.repo, name, category, &date, stats);
                        }
                        Err(e) if !e.is_retryable() => Err::<(), HubError>(e)?,
                        Err(e) => {
                            yield FetchResult::failure(&source.repo, name, category, &date, e.to_string());
                        }
                    }
                }
                None => {
                    let mut cursor: Option<PageCursor> = None;
                    let mut last_page: Option<u32> = None;

                    loop {
                        let what = format!("listing {} page {}", source.repo, describe(cursor.as_ref()));
                        let listed = self
                            .retry
                            .run(&what, || self.hub.list_items(category, &source.repo, cursor.as_ref()))
                            .await;

                        match listed {
                            Ok(page) => {
                                if page.last_page.is_some() {
                                    last_page = page.last_page;
                                }
                                for item in page.items {
                                    match self.enrich(category, &item).await {
                                        Ok(stats) => {
                                            yield FetchResult::success(&source.repo, item.name(), category, &date, stats);
                                        }
                                        // Listed items are hub data, never a malformed source
                                        Err(e) => {
                                            yield FetchResult::failure(&source.repo, item.name(), category, &date, e.to_string());
                                        }
                                    }
                                }
                                match page.next {
                                    Some(next) => cursor = Some(next),
                                    None => break,
                                }
                            }
                            Err(e) if !e.is_retryable() => Err::<(), HubError>(e)?,
                            Err(e) => {
                                yield FetchResult::failure(&source.repo, "", category, &date, e.to_string())
                                    .with_page(describe(cursor.as_ref()));
                                match skip_failed_page(cursor.as_ref(), last_page) {
                                    Some(next) => cursor = Some(next),
                                    None => break,
                                }
                            }
                        }
                    }
                }
            }

            tracing::info!("Finished {}", source);
        })
    }

    /// Looks up one item and its discussion counts
    async fn fetch_single(&self, category: Category, id: &str) -> HubResult<ItemStats> {
        let what = format!("item info for {}", id);
        let info = self
            .retry
            .run(&what, || self.hub.item_info(category, id))
            .await?;
        self.enrich(category, &info).await
    }

    /// Adds discussion counts and the canonical link to listed metadata
    async fn enrich(&self, category: Category, info: &ItemInfo) -> HubResult<ItemStats> {
        let (discussion_count, discussion_message_count) =
            self.count_discussions(category, &info.id).await?;
        Ok(ItemStats {
            downloads: info.downloads,
            likes: info.likes,
            discussion_count,
            discussion_message_count,
            link: self.hub.item_link(category, &info.id),
        })
    }

    /// Counts discussion threads and their messages
    ///
    /// Returns `(None, None)` on platforms without discussions. Any call that
    /// fails after retries fails the whole count.
    async fn count_discussions(
        &self,
        category: Category,
        id: &str,
    ) -> HubResult<(Option<u64>, Option<u64>)> {
        if !self.hub.has_discussions() {
            return Ok((None, None));
        }

        let mut threads = 0u64;
        let mut messages = 0u64;
        let mut cursor: Option<PageCursor> = None;

        loop {
            let what = format!("discussions of {} page {}", id, describe(cursor.as_ref()));
            let page = self
                .retry
                .run(&what, || self.hub.list_discussions(category, id, cursor.as_ref()))
                .await?;

            for discussion in page.items {
                threads += 1;
                let what = format!("discussion {} of {}", discussion.num, id);
                messages += self
                    .retry
                    .run(&what, || {
                        self.hub.discussion_message_count(category, id, discussion.num)
                    })
                    .await?;
            }

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!("{}: {} discussions, {} messages", id, threads, messages);
        Ok((Some(threads), Some(messages)))
    }
}

fn describe(cursor: Option<&PageCursor>) -> String {
    match cursor {
        Some(cursor) => cursor.to_string(),
        None => "first page".to_string(),
    }
}

/// Cursor to continue with after a page that could not be fetched
///
/// Only page-numbered listings with a known last page can step over a
/// failed page; opaque cursors end the enumeration.
fn skip_failed_page(cursor: Option<&PageCursor>, last_page: Option<u32>) -> Option<PageCursor> {
    match (cursor, last_page) {
        (Some(PageCursor::Number(n)), Some(last)) if *n < last => Some(PageCursor::Number(n + 1)),
        _ => None,
    }
}

impl std::fmt::Debug for FetchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchEngine")
            .field("platform", &self.hub.platform())
            .field("retry", &self.retry)
            .finish()
    }
}
