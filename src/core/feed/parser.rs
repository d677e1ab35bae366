use feed_rs::model::Entry;

use super::types::FeedItem;

const UNTITLED_ITEM: &str = "Untitled Essay";

#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("feed payload is empty")]
    EmptyPayload,
    #[error("feed parse error: {0}")]
    Xml(#[from] feed_rs::parser::ParseFeedError),
}

/// Parses an RSS or Atom payload into items, in feed order.
pub fn parse_feed_bytes(raw: &[u8]) -> Result<Vec<FeedItem>, FeedParseError> {
    let trimmed = trim_leading_ascii_whitespace(raw);
    if trimmed.is_empty() {
        return Err(FeedParseError::EmptyPayload);
    }
    let feed = feed_rs::parser::parse(trimmed)?;
    Ok(feed.entries.iter().map(item_from_xml).collect())
}

fn item_from_xml(entry: &Entry) -> FeedItem {
    let title = entry
        .title
        .as_ref()
        .map(|text| text.content.trim().to_string())
        .unwrap_or_else(|| UNTITLED_ITEM.to_string());
    let permalink = entry
        .links
        .first()
        .map(|link| link.href.clone())
        .unwrap_or_default();
    let authors = entry
        .authors
        .iter()
        .map(|person| person.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    FeedItem {
        title,
        permalink,
        authors,
        published_at: entry.published.or(entry.updated),
        enclosure_image: enclosure_image(entry),
    }
}

/// First image-like media attachment of an entry. RSS `<enclosure>` and
/// `media:content` both land in `entry.media`.
fn enclosure_image(entry: &Entry) -> Option<String> {
    let content = entry
        .media
        .iter()
        .flat_map(|media| media.content.iter())
        .filter(|content| {
            content
                .content_type
                .as_ref()
                .map_or(true, |mime| mime.to_string().starts_with("image/"))
        })
        .find_map(|content| content.url.as_ref().map(|url| url.to_string()));
    if content.is_some() {
        return content;
    }
    entry
        .media
        .iter()
        .flat_map(|media| media.thumbnails.iter())
        .map(|thumbnail| thumbnail.image.uri.clone())
        .next()
}

fn trim_leading_ascii_whitespace(raw: &[u8]) -> &[u8] {
    let mut index = 0;
    while index < raw.len() && raw[index].is_ascii_whitespace() {
        index += 1;
    }
    &raw[index..]
}
