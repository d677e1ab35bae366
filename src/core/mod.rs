pub mod feed;
pub mod html;
pub mod storage;
pub mod widget;

use std::collections::BTreeMap;
use std::sync::Arc;

use widget::{Widget, WidgetDescriptor};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("widget {0} is already registered")]
    Duplicate(&'static str),
}

/// Widget types known to the host, keyed by their id base.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    widgets: BTreeMap<&'static str, Arc<dyn Widget>>,
}

impl WidgetRegistry {
    pub fn register(&mut self, widget: Arc<dyn Widget>) -> Result<(), RegistryError> {
        let id_base = widget.descriptor().id_base;
        if self.widgets.contains_key(id_base) {
            return Err(RegistryError::Duplicate(id_base));
        }
        tracing::info!(widget = id_base, "widget registered");
        self.widgets.insert(id_base, widget);
        Ok(())
    }

    pub fn get(&self, id_base: &str) -> Option<Arc<dyn Widget>> {
        self.widgets.get(id_base).cloned()
    }

    pub fn descriptors(&self) -> Vec<WidgetDescriptor> {
        self.widgets
            .values()
            .map(|widget| widget.descriptor().clone())
            .collect()
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.widgets.keys()).finish()
    }
}
