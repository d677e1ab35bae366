pub mod essays;
pub mod form;
pub mod render;
pub mod settings;

use async_trait::async_trait;

use settings::{FieldNaming, FormSubmission, WidgetSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDescriptor {
    pub id_base: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Lifecycle hooks a host drives for every placed widget instance.
#[async_trait]
pub trait Widget: Send + Sync {
    fn descriptor(&self) -> &WidgetDescriptor;

    /// Front-end HTML for an instance.
    async fn render(&self, settings: &WidgetSettings) -> String;

    /// Admin form HTML for an instance.
    fn render_form(&self, settings: &WidgetSettings, naming: &FieldNaming) -> String;

    /// Settings to persist after an admin submission.
    fn update(&self, submission: &FormSubmission, old: &WidgetSettings) -> WidgetSettings;
}
