use std::env;
use std::time::Duration;

use crate::core::feed::source::HttpFeedOptions;

pub const DEFAULT_FEED_URL: &str = "http://heropress.com/essays/feed/";
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub feed_url: String,
    pub database_url: String,
    pub feed: HttpFeedOptions,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            feed: HttpFeedOptions::default(),
        }
    }
}

impl WidgetConfig {
    /// Reads `ESSAYS_*` variables, after loading `.env.local` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |name: &str, fallback: String| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
        };
        let number = |name: &'static str, fallback: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidNumber { name, value })
                }
                _ => Ok(fallback),
            }
        };

        let timeout_secs = number("ESSAYS_HTTP_TIMEOUT_SECS", defaults.feed.timeout.as_secs())?;
        let max_retries = number("ESSAYS_FETCH_RETRIES", defaults.feed.max_retries as u64)?;
        let cache_secs = number(
            "ESSAYS_FEED_CACHE_SECS",
            defaults.feed.cache_lifetime.as_secs(),
        )?;

        Ok(Self {
            feed_url: text("ESSAYS_FEED_URL", defaults.feed_url),
            database_url: text("ESSAYS_DATABASE_URL", defaults.database_url),
            feed: HttpFeedOptions {
                timeout: Duration::from_secs(timeout_secs),
                max_retries: max_retries as usize,
                cache_lifetime: Duration::from_secs(cache_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = WidgetConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.feed_url, "http://heropress.com/essays/feed/");
        assert_eq!(config.feed.cache_lifetime, Duration::from_secs(43_200));
    }

    #[test]
    fn overrides_are_applied() {
        let config = WidgetConfig::from_lookup(lookup(&[
            ("ESSAYS_FEED_URL", " https://example.com/feed/ "),
            ("ESSAYS_DATABASE_URL", "sqlite://widgets.db?mode=rwc"),
            ("ESSAYS_HTTP_TIMEOUT_SECS", "5"),
            ("ESSAYS_FETCH_RETRIES", "0"),
            ("ESSAYS_FEED_CACHE_SECS", ""),
        ]))
        .expect("overrides are valid");

        assert_eq!(config.feed_url, "https://example.com/feed/");
        assert_eq!(config.database_url, "sqlite://widgets.db?mode=rwc");
        assert_eq!(config.feed.timeout, Duration::from_secs(5));
        assert_eq!(config.feed.max_retries, 0);
        assert_eq!(config.feed.cache_lifetime, Duration::from_secs(43_200));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let result = WidgetConfig::from_lookup(lookup(&[("ESSAYS_FETCH_RETRIES", "-1")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidNumber { name: "ESSAYS_FETCH_RETRIES", .. })
        ));
    }
}
