use async_trait::async_trait;

use super::form::render_form;
use super::render::render_items;
use super::settings::{sanitize_submission, FieldNaming, FormSubmission, WidgetSettings};
use super::{Widget, WidgetDescriptor};
use crate::core::feed::EssayFetcher;

pub const RECENT_ESSAYS: WidgetDescriptor = WidgetDescriptor {
    id_base: "heropress-recent-essays-widget",
    name: "HeroPress Most Recent Essay",
    description: "Renders recent essays from HeroPress.com.",
};

/// Lists the newest essays from the configured feed.
#[derive(Debug, Clone)]
pub struct RecentEssaysWidget {
    descriptor: WidgetDescriptor,
    fetcher: EssayFetcher,
}

impl RecentEssaysWidget {
    pub fn new(fetcher: EssayFetcher) -> Self {
        Self {
            descriptor: RECENT_ESSAYS,
            fetcher,
        }
    }
}

#[async_trait]
impl Widget for RecentEssaysWidget {
    fn descriptor(&self) -> &WidgetDescriptor {
        &self.descriptor
    }

    async fn render(&self, settings: &WidgetSettings) -> String {
        let items = self.fetcher.fetch(settings.fetch_limit()).await;
        render_items(&items, settings)
    }

    fn render_form(&self, settings: &WidgetSettings, naming: &FieldNaming) -> String {
        render_form(settings, naming)
    }

    fn update(&self, submission: &FormSubmission, old: &WidgetSettings) -> WidgetSettings {
        let updated = sanitize_submission(submission);
        if updated.item_count != old.item_count {
            tracing::debug!(
                from = old.item_count,
                to = updated.item_count,
                "essay count changed"
            );
        }
        updated
    }
}
