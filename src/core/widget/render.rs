use std::fmt::Write as _;

use super::settings::WidgetSettings;
use crate::core::feed::types::FeedItem;
use crate::core::html::{escape, escape_url};

const LINK_CLASS: &str = "heropress_essay_title";
const AUTHOR_CLASS: &str = "heropress_contributor";
const PUBDATE_CLASS: &str = "heropress_essay_pubdate";
const PUBDATE_PREFIX_CLASS: &str = "heropress_essay_pubdate_prefix";
const PUBDATE_PREFIX: &str = "Posted";
/// Day without padding, full month name, four-digit year: `4 March 2021`.
const PUBDATE_FORMAT: &str = "%-d %B %Y";

/// Renders `items` as an unordered list. No items, no markup.
pub fn render_items(items: &[FeedItem], settings: &WidgetSettings) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut buf = String::from("<ul>\n");
    for item in items {
        buf.push_str("<li>");
        render_item(&mut buf, item, settings);
        buf.push_str("</li>\n");
    }
    buf.push_str("</ul>\n");
    buf
}

fn render_item(buf: &mut String, item: &FeedItem, settings: &WidgetSettings) {
    let permalink = escape_url(&item.permalink);

    if settings.show_banner {
        if let Some(image) = item.enclosure_image.as_deref() {
            let _ = writeln!(
                buf,
                r#"<a class="{LINK_CLASS}" href="{permalink}"><img src="{}"></a>"#,
                escape_url(image)
            );
        }
    }

    if settings.show_title {
        let _ = writeln!(
            buf,
            r#"<a class="{LINK_CLASS}" href="{permalink}">{}</a>"#,
            escape(&item.title)
        );
    }

    if settings.show_author {
        if let Some(author) = item.first_author() {
            let _ = writeln!(buf, r#"<div class="{AUTHOR_CLASS}">{}</div>"#, escape(author));
        }
    }

    if settings.show_pubdate {
        if let Some(published) = item.published_at {
            let _ = writeln!(
                buf,
                r#"<div class="{PUBDATE_CLASS}"><span class="{PUBDATE_PREFIX_CLASS}">{PUBDATE_PREFIX}</span> {}</div>"#,
                published.format(PUBDATE_FORMAT)
            );
        }
    }
}
