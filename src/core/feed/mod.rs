pub mod cache;
pub mod fetcher;
pub mod parser;
pub mod source;
pub mod types;

use std::sync::Arc;

use source::FeedSource;
use types::FeedItem;

/// Pulls the newest essays from one fixed feed URL.
#[derive(Clone)]
pub struct EssayFetcher {
    source: Arc<dyn FeedSource>,
    feed_url: String,
}

impl EssayFetcher {
    pub fn new(source: Arc<dyn FeedSource>, feed_url: impl Into<String>) -> Self {
        Self {
            source,
            feed_url: feed_url.into(),
        }
    }

    /// Up to `limit` items in feed order. Any fetch or parse failure yields
    /// an empty list.
    pub async fn fetch(&self, limit: usize) -> Vec<FeedItem> {
        match self.source.fetch_feed(&self.feed_url).await {
            Ok(handle) => {
                let quantity = handle.item_quantity(limit);
                handle.items(0, quantity).to_vec()
            }
            Err(error) => {
                tracing::debug!(url = %self.feed_url, %error, "essay feed unavailable");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for EssayFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EssayFetcher")
            .field("feed_url", &self.feed_url)
            .finish_non_exhaustive()
    }
}
