use async_trait::async_trait;
use std::time::Duration;

use super::cache::FeedCache;
use super::fetcher::{build_client, fetch_with_retry, FetchError, FetchStatus, Validators};
use super::parser::{parse_feed_bytes, FeedParseError};
use super::types::FeedItem;

/// Any reason a feed could not be produced. Callers that favour
/// availability treat every variant the same way.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("feed parse failed: {0}")]
    Parse(#[from] FeedParseError),
    #[error("feed answered not-modified but nothing is cached for {0}")]
    NotCached(String),
}

/// A successfully fetched feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedHandle {
    items: Vec<FeedItem>,
}

impl FeedHandle {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self { items }
    }

    /// Number of items available, capped at `max`. A `max` of zero means no
    /// cap.
    pub fn item_quantity(&self, max: usize) -> usize {
        if max == 0 {
            self.items.len()
        } else {
            max.min(self.items.len())
        }
    }

    /// Items from `offset`, at most `count` of them. Out-of-range requests
    /// yield an empty slice.
    pub fn items(&self, offset: usize, count: usize) -> &[FeedItem] {
        let start = offset.min(self.items.len());
        let end = start.saturating_add(count).min(self.items.len());
        &self.items[start..end]
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self, url: &str) -> Result<FeedHandle, FeedError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpFeedOptions {
    pub timeout: Duration,
    pub max_retries: usize,
    pub cache_lifetime: Duration,
}

impl Default for HttpFeedOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_retries: 2,
            cache_lifetime: Duration::from_secs(12 * 60 * 60),
        }
    }
}

/// Fetches feeds over HTTP and keeps parsed results in a transient cache.
///
/// Fresh cache entries are served without touching the network. Stale ones
/// are revalidated with their validators, and served as-is when the remote
/// end is unreachable.
#[derive(Debug)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    max_retries: usize,
    cache: FeedCache,
}

impl HttpFeedSource {
    pub fn new(options: HttpFeedOptions) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(options.timeout)?,
            max_retries: options.max_retries,
            cache: FeedCache::new(options.cache_lifetime),
        })
    }

    async fn refresh(&self, url: &str, validators: &Validators) -> Result<FeedHandle, FeedError> {
        match fetch_with_retry(&self.client, url, validators, self.max_retries).await? {
            FetchStatus::NotModified => {
                let cached = self
                    .cache
                    .touch(url)
                    .await
                    .ok_or_else(|| FeedError::NotCached(url.to_string()))?;
                tracing::debug!(url, "feed not modified");
                Ok(FeedHandle::new(cached.items))
            }
            FetchStatus::Updated(payload) => {
                let items = parse_feed_bytes(&payload.body)?;
                tracing::debug!(url, items = items.len(), "feed refreshed");
                self.cache
                    .store(url, items.clone(), payload.validators)
                    .await;
                Ok(FeedHandle::new(items))
            }
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_feed(&self, url: &str) -> Result<FeedHandle, FeedError> {
        let cached = self.cache.get(url).await;
        if let Some(entry) = &cached {
            if entry.is_fresh(self.cache.lifetime()) {
                tracing::trace!(url, "serving feed from cache");
                return Ok(FeedHandle::new(entry.items.clone()));
            }
        }

        let validators = cached
            .as_ref()
            .map(|entry| entry.validators.clone())
            .unwrap_or_default();
        match self.refresh(url, &validators).await {
            Ok(handle) => Ok(handle),
            Err(error) => match cached {
                Some(stale) => {
                    tracing::warn!(url, %error, "feed refresh failed, serving stale copy");
                    Ok(FeedHandle::new(stale.items))
                }
                None => Err(error),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feed::fetcher::test_server::FeedServer;

    fn item(index: usize) -> FeedItem {
        FeedItem {
            title: format!("Essay {index}"),
            permalink: format!("https://example.com/{index}"),
            authors: vec!["Jane".to_string()],
            published_at: None,
            enclosure_image: None,
        }
    }

    fn options(cache_lifetime: Duration) -> HttpFeedOptions {
        HttpFeedOptions {
            timeout: Duration::from_secs(5),
            max_retries: 0,
            cache_lifetime,
        }
    }

    #[test]
    fn item_quantity_caps_at_available_items() {
        let handle = FeedHandle::new((0..3).map(item).collect());
        assert_eq!(handle.item_quantity(5), 3);
        assert_eq!(handle.item_quantity(2), 2);
        assert_eq!(handle.item_quantity(0), 3);
    }

    #[test]
    fn items_window_is_clamped_to_bounds() {
        let handle = FeedHandle::new((0..3).map(item).collect());
        assert_eq!(handle.items(0, 2).len(), 2);
        assert_eq!(handle.items(2, 5).len(), 1);
        assert!(handle.items(7, 1).is_empty());
        assert_eq!(handle.items(1, usize::MAX)[0].title, "Essay 1");
    }

    #[tokio::test]
    async fn fresh_cache_entries_skip_the_network() {
        let server = FeedServer::new(0);
        let (base, server_task) = server.clone().spawn().await;
        let url = format!("{base}/feed/");
        let source = HttpFeedSource::new(options(Duration::from_secs(3600)))
            .expect("source should build");

        let first = source.fetch_feed(&url).await.expect("first fetch");
        let second = source.fetch_feed(&url).await.expect("cached fetch");

        assert_eq!(first, second);
        assert_eq!(first.item_quantity(0), 6);
        assert_eq!(server.hits(), 1);
        server_task.abort();
    }

    #[tokio::test]
    async fn stale_entries_are_revalidated() {
        let server = FeedServer::new(0);
        let (base, server_task) = server.clone().spawn().await;
        let url = format!("{base}/feed/");
        let source = HttpFeedSource::new(options(Duration::ZERO)).expect("source should build");

        let first = source.fetch_feed(&url).await.expect("first fetch");
        let second = source.fetch_feed(&url).await.expect("revalidated fetch");

        assert_eq!(first, second);
        assert_eq!(server.hits(), 2);
        server_task.abort();
    }

    #[tokio::test]
    async fn stale_copy_is_served_when_the_remote_fails() {
        let server = FeedServer::new(0);
        let (base, server_task) = server.clone().spawn().await;
        let url = format!("{base}/feed/");
        let source = HttpFeedSource::new(options(Duration::ZERO)).expect("source should build");

        let first = source.fetch_feed(&url).await.expect("first fetch");
        server_task.abort();
        let _ = server_task.await;
        let fallback = source
            .fetch_feed(&url)
            .await
            .expect("stale copy should be served");

        assert_eq!(first, fallback);
    }

    #[tokio::test]
    async fn missing_feed_without_cache_is_an_error() {
        let server = FeedServer::new(0);
        let (base, server_task) = server.clone().spawn().await;
        let source = HttpFeedSource::new(options(Duration::from_secs(60)))
            .expect("source should build");

        let result = source.fetch_feed(&format!("{base}/missing/")).await;

        assert!(matches!(
            result,
            Err(FeedError::Fetch(FetchError::HttpStatus(404)))
        ));
        server_task.abort();
    }
}
