use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::html::strip_tags;

pub const MIN_ITEM_COUNT: u32 = 1;
pub const MAX_ITEM_COUNT: u32 = 5;

/// Form field keys, also used as the suffix of namespaced field names.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const ITEM_COUNT: &str = "heropress-essay-count";
    pub const SHOW_BANNER: &str = "heropress-show-banner";
    pub const SHOW_TITLE: &str = "heropress-show-title";
    pub const SHOW_AUTHOR: &str = "heropress-show-author";
    pub const SHOW_PUBDATE: &str = "heropress-show-pubdate";
}

/// Configuration of one widget instance. Keys missing from a stored record
/// take their value from [`WidgetSettings::default_settings`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetSettings {
    pub title: String,
    /// As last submitted; may lie outside 1..=5. See [`Self::fetch_limit`].
    pub item_count: u32,
    pub show_banner: bool,
    pub show_title: bool,
    pub show_author: bool,
    pub show_pubdate: bool,
}

impl WidgetSettings {
    pub fn default_settings() -> Self {
        Self {
            title: String::new(),
            item_count: MAX_ITEM_COUNT,
            show_banner: true,
            show_title: true,
            show_author: true,
            show_pubdate: true,
        }
    }

    /// Number of essays to request from the feed, always within 1..=5.
    pub fn fetch_limit(&self) -> usize {
        self.item_count.clamp(MIN_ITEM_COUNT, MAX_ITEM_COUNT) as usize
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self::default_settings()
    }
}

/// Builds field ids and names namespaced to one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNaming {
    id_base: String,
    number: u64,
}

impl FieldNaming {
    pub fn new(id_base: impl Into<String>, number: u64) -> Self {
        Self {
            id_base: id_base.into(),
            number,
        }
    }

    pub fn field_id(&self, field: &str) -> String {
        format!("widget-{}-{}-{}", self.id_base, self.number, field)
    }

    pub fn field_name(&self, field: &str) -> String {
        format!("widget-{}[{}][{}]", self.id_base, self.number, field)
    }
}

/// Raw values posted by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    values: BTreeMap<String, String>,
}

impl FormSubmission {
    /// Parses an `application/x-www-form-urlencoded` body. Namespaced names
    /// matching `naming` are reduced to their bare field key; everything else
    /// is kept verbatim. Later duplicates win.
    pub fn from_urlencoded(body: &[u8], naming: Option<&FieldNaming>) -> Self {
        let mut values = BTreeMap::new();
        for (name, value) in url::form_urlencoded::parse(body) {
            let key = naming
                .and_then(|naming| bare_field_key(naming, &name))
                .unwrap_or_else(|| name.to_string());
            values.insert(key, value.into_owned());
        }
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSubmission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

fn bare_field_key(naming: &FieldNaming, name: &str) -> Option<String> {
    let prefix = format!("widget-{}[{}][", naming.id_base, naming.number);
    name.strip_prefix(&prefix)?
        .strip_suffix(']')
        .map(ToString::to_string)
}

/// Sanitizes a submission into settings. Nothing is rejected: the title
/// loses its markup, numbers go through [`absint`], and a flag is on only
/// when its value coerces to exactly 1. The item count is not re-clamped.
pub fn sanitize_submission(submission: &FormSubmission) -> WidgetSettings {
    let title = submission
        .get(fields::TITLE)
        .filter(|title| !title.is_empty())
        .map(|title| strip_tags(title).into_owned())
        .unwrap_or_default();
    let coerce = |field: &str| absint(submission.get(field).unwrap_or_default());
    let flag = |field: &str| coerce(field) == 1;

    WidgetSettings {
        title,
        item_count: coerce(fields::ITEM_COUNT),
        show_banner: flag(fields::SHOW_BANNER),
        show_title: flag(fields::SHOW_TITLE),
        show_author: flag(fields::SHOW_AUTHOR),
        show_pubdate: flag(fields::SHOW_PUBDATE),
    }
}

/// Absolute value of the leading integer in `raw`; 0 when there is none.
/// Saturates instead of overflowing.
pub fn absint(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    unsigned
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0_u32, |total, digit| {
            total.saturating_mul(10).saturating_add(digit)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_show_everything_and_five_items() {
        let settings = WidgetSettings::default();
        assert_eq!(settings.item_count, 5);
        assert!(settings.show_banner && settings.show_title);
        assert!(settings.show_author && settings.show_pubdate);
        assert!(settings.title.is_empty());
    }

    #[test]
    fn missing_keys_in_stored_records_use_defaults() {
        let stored: WidgetSettings =
            serde_json::from_str(r#"{"title":"Essays","show_author":false}"#)
                .expect("partial record should deserialize");
        assert_eq!(stored.title, "Essays");
        assert_eq!(stored.item_count, 5);
        assert!(!stored.show_author);
        assert!(stored.show_pubdate);
    }

    #[test]
    fn fetch_limit_is_clamped() {
        let mut settings = WidgetSettings::default();
        for (stored, limit) in [(0, 1), (3, 3), (5, 5), (9, 5)] {
            settings.item_count = stored;
            assert_eq!(settings.fetch_limit(), limit);
        }
    }

    #[test]
    fn absint_follows_leading_digits() {
        assert_eq!(absint("3"), 3);
        assert_eq!(absint(" -4"), 4);
        assert_eq!(absint("12abc"), 12);
        assert_eq!(absint("3.9"), 3);
        assert_eq!(absint("abc"), 0);
        assert_eq!(absint(""), 0);
        assert_eq!(absint("99999999999999"), u32::MAX);
    }

    #[test]
    fn sanitize_strips_title_markup() {
        let submission: FormSubmission = [("title", "<b>Hi</b>")].into_iter().collect();
        assert_eq!(sanitize_submission(&submission).title, "Hi");
    }

    #[test]
    fn sanitize_keeps_literal_less_than_in_titles() {
        let submission: FormSubmission = [("title", "Essays for 1 < 2 readers")]
            .into_iter()
            .collect();
        assert_eq!(
            sanitize_submission(&submission).title,
            "Essays for 1 < 2 readers"
        );
    }

    #[test]
    fn sanitize_keeps_out_of_range_counts() {
        let submission: FormSubmission = [("heropress-essay-count", "9")].into_iter().collect();
        assert_eq!(sanitize_submission(&submission).item_count, 9);

        let submission: FormSubmission = [("heropress-essay-count", "many")].into_iter().collect();
        assert_eq!(sanitize_submission(&submission).item_count, 0);
    }

    #[test]
    fn absent_checkboxes_turn_flags_off() {
        let submission: FormSubmission = [("heropress-show-title", "1"), ("heropress-show-author", "2")]
            .into_iter()
            .collect();
        let settings = sanitize_submission(&submission);
        assert!(settings.show_title);
        assert!(!settings.show_author);
        assert!(!settings.show_banner);
        assert!(!settings.show_pubdate);
    }

    #[test]
    fn urlencoded_bodies_accept_bare_and_namespaced_names() {
        let naming = FieldNaming::new("heropress-recent-essays-widget", 3);
        let body = b"widget-heropress-recent-essays-widget%5B3%5D%5Btitle%5D=%3Cb%3EHi%3C%2Fb%3E\
&widget-heropress-recent-essays-widget%5B3%5D%5Bheropress-essay-count%5D=2&heropress-show-banner=1";
        let submission = FormSubmission::from_urlencoded(body, Some(&naming));

        assert_eq!(submission.get("title"), Some("<b>Hi</b>"));
        assert_eq!(submission.get("heropress-essay-count"), Some("2"));
        assert_eq!(submission.get("heropress-show-banner"), Some("1"));
    }

    #[test]
    fn field_naming_matches_widget_conventions() {
        let naming = FieldNaming::new("heropress-recent-essays-widget", 2);
        assert_eq!(naming.field_id("title"), "widget-heropress-recent-essays-widget-2-title");
        assert_eq!(naming.field_name("title"), "widget-heropress-recent-essays-widget[2][title]");
    }
}
