use chrono::{DateTime, Utc};

/// One entry of the remote essay feed, as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub permalink: String,
    pub authors: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub enclosure_image: Option<String>,
}

impl FeedItem {
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}
