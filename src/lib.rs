mod config;
mod core;

use std::sync::Arc;

pub use config::{ConfigError, WidgetConfig, DEFAULT_FEED_URL};
pub use crate::core::feed::fetcher::FetchError;
pub use crate::core::feed::parser::{parse_feed_bytes, FeedParseError};
pub use crate::core::feed::source::{FeedError, FeedHandle, FeedSource, HttpFeedOptions, HttpFeedSource};
pub use crate::core::feed::types::FeedItem;
pub use crate::core::feed::EssayFetcher;
pub use crate::core::storage::models::WidgetInstanceRecord;
pub use crate::core::storage::repository::{SettingsRepository, StorageError};
pub use crate::core::widget::essays::{RecentEssaysWidget, RECENT_ESSAYS};
pub use crate::core::widget::settings::{FieldNaming, FormSubmission, WidgetSettings};
pub use crate::core::widget::{Widget, WidgetDescriptor};
pub use crate::core::{RegistryError, WidgetRegistry};

use crate::core::html::escape;

/// Theme markup wrapped around a rendered widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetArgs {
    pub before_widget: String,
    pub after_widget: String,
    pub before_title: String,
    pub after_title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("widget {0} is not registered")]
    UnknownWidget(String),
    #[error("widget instance {0} not found")]
    UnknownInstance(i64),
}

/// Installs a `tracing` subscriber filtered by `RUST_LOG`. Does nothing when
/// the host already installed one.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recent_essays_widget=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Registers every widget this crate provides. Hosts call this once during
/// startup.
pub fn register_widgets(
    registry: &mut WidgetRegistry,
    fetcher: EssayFetcher,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(RecentEssaysWidget::new(fetcher)))
}

/// Drives widget instances on behalf of a host: persistence, page chrome and
/// admin submissions.
#[derive(Debug, Clone)]
pub struct WidgetHost {
    registry: WidgetRegistry,
    repository: SettingsRepository,
}

impl WidgetHost {
    pub fn new(registry: WidgetRegistry, repository: SettingsRepository) -> Self {
        Self {
            registry,
            repository,
        }
    }

    /// Bootstraps from `ESSAYS_*` environment variables.
    pub async fn from_env() -> Result<Self, HostError> {
        let config = WidgetConfig::from_env()?;
        Self::bootstrap(&config).await
    }

    /// Startup sequence: feed source, widget registration, settings store.
    pub async fn bootstrap(config: &WidgetConfig) -> Result<Self, HostError> {
        let source = Arc::new(HttpFeedSource::new(config.feed)?);
        let fetcher = EssayFetcher::new(source, config.feed_url.clone());
        let mut registry = WidgetRegistry::default();
        register_widgets(&mut registry, fetcher)?;
        let repository = SettingsRepository::connect(&config.database_url).await?;
        tracing::info!(feed_url = %config.feed_url, "widget host ready");
        Ok(Self::new(registry, repository))
    }

    /// Widget types a site admin can place, with their names and
    /// descriptions.
    pub fn available_widgets(&self) -> Vec<WidgetDescriptor> {
        self.registry.descriptors()
    }

    /// Places a new instance of `widget_id` with default settings.
    pub async fn create_instance(&self, widget_id: &str) -> Result<i64, HostError> {
        let widget = self.widget(widget_id)?;
        let record = self
            .repository
            .create_instance(widget.descriptor().id_base, &WidgetSettings::default_settings())
            .await?;
        tracing::debug!(widget = widget_id, instance = record.id, "widget instance created");
        Ok(record.id)
    }

    pub async fn display(&self, instance_id: i64, args: &WidgetArgs) -> Result<String, HostError> {
        let (widget, settings) = self.load(instance_id).await?;
        let body = widget.render(&settings).await;

        let mut output = String::new();
        output.push_str(&args.before_widget);
        if !settings.title.is_empty() {
            output.push_str(&args.before_title);
            output.push_str(&escape(&settings.title));
            output.push_str(&args.after_title);
        }
        output.push_str(&body);
        output.push_str(&args.after_widget);
        Ok(output)
    }

    pub async fn admin_form(&self, instance_id: i64) -> Result<String, HostError> {
        let (widget, settings) = self.load(instance_id).await?;
        let naming = FieldNaming::new(widget.descriptor().id_base, instance_id.unsigned_abs());
        Ok(widget.render_form(&settings, &naming))
    }

    /// Applies a url-encoded admin form body and persists the result.
    pub async fn save_form(&self, instance_id: i64, body: &[u8]) -> Result<WidgetSettings, HostError> {
        let (widget, old) = self.load(instance_id).await?;
        let naming = FieldNaming::new(widget.descriptor().id_base, instance_id.unsigned_abs());
        let submission = FormSubmission::from_urlencoded(body, Some(&naming));
        let updated = widget.update(&submission, &old);
        let affected = self.repository.save_settings(instance_id, &updated).await?;
        if affected == 0 {
            return Err(HostError::UnknownInstance(instance_id));
        }
        tracing::debug!(instance = instance_id, "widget settings saved");
        Ok(updated)
    }

    pub async fn delete_instance(&self, instance_id: i64) -> Result<(), HostError> {
        match self.repository.delete_instance(instance_id).await? {
            0 => Err(HostError::UnknownInstance(instance_id)),
            _ => Ok(()),
        }
    }

    fn widget(&self, widget_id: &str) -> Result<Arc<dyn Widget>, HostError> {
        self.registry
            .get(widget_id)
            .ok_or_else(|| HostError::UnknownWidget(widget_id.to_string()))
    }

    async fn load(&self, instance_id: i64) -> Result<(Arc<dyn Widget>, WidgetSettings), HostError> {
        let record = self
            .repository
            .get_instance(instance_id)
            .await?
            .ok_or(HostError::UnknownInstance(instance_id))?;
        let widget = self.widget(&record.widget_id)?;
        Ok((widget, record.decode_settings()?))
    }
}
