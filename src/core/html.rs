//! Output escaping and markup stripping for widget HTML.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

const ALLOWED_URL_SCHEMES: [&str; 2] = ["http", "https"];

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Comments first, then tags. A tag opens with `<` plus a letter, `/`, `!`
    // or `?`; quoted attribute values may contain `>`. A trailing tag that
    // never closes runs to the end.
    Regex::new(r#"(?s)<!--.*?(-->|$)|</?[A-Za-z!?](?:"[^"]*"|'[^']*'|[^'">])*(>|$)"#)
        .expect("tag pattern is valid")
});

fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escapes text for an HTML text node or a quoted attribute value.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(&ESCAPE_CHARS[..]) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escapes a URL for use in `href`/`src`. Absolute URLs with a scheme other
/// than http(s) are replaced by an empty string; relative references pass.
pub fn escape_url(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cow::Borrowed("");
    }
    match url::Url::parse(trimmed) {
        Ok(parsed) if !ALLOWED_URL_SCHEMES.contains(&parsed.scheme()) => Cow::Borrowed(""),
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => escape(trimmed),
        Err(_) => Cow::Borrowed(""),
    }
}

/// Removes markup tags and comments, keeping the text between them.
pub fn strip_tags(s: &str) -> Cow<'_, str> {
    if !s.contains('<') {
        return Cow::Borrowed(s);
    }
    TAG_PATTERN.replace_all(s, "")
}
