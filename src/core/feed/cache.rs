use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::fetcher::Validators;
use super::types::FeedItem;

#[derive(Debug, Clone)]
pub struct CachedFeed {
    pub items: Vec<FeedItem>,
    pub validators: Validators,
    stored_at: Instant,
}

impl CachedFeed {
    pub fn is_fresh(&self, lifetime: Duration) -> bool {
        self.stored_at.elapsed() < lifetime
    }
}

/// Transient per-URL store for parsed feeds.
#[derive(Debug)]
pub struct FeedCache {
    lifetime: Duration,
    entries: RwLock<HashMap<String, CachedFeed>>,
}

impl FeedCache {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub async fn get(&self, url: &str) -> Option<CachedFeed> {
        self.entries.read().await.get(&cache_key(url)).cloned()
    }

    pub async fn store(&self, url: &str, items: Vec<FeedItem>, validators: Validators) {
        let entry = CachedFeed {
            items,
            validators,
            stored_at: Instant::now(),
        };
        self.entries.write().await.insert(cache_key(url), entry);
    }

    /// Marks an entry as fresh again after a not-modified response.
    pub async fn touch(&self, url: &str) -> Option<CachedFeed> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&cache_key(url))?;
        entry.stored_at = Instant::now();
        Some(entry.clone())
    }
}

fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"feed::");
    hasher.update(url.trim().as_bytes());
    let bytes = hasher.finalize();
    format!("{bytes:x}")
}
