use sqlx::FromRow;

/// A stored widget placement. `settings` holds the JSON-encoded settings.
#[derive(Debug, Clone, FromRow)]
pub struct WidgetInstanceRecord {
    pub id: i64,
    pub widget_id: String,
    pub settings: String,
    pub created_at: String,
    pub updated_at: String,
}
