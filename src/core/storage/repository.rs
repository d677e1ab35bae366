use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use super::models::WidgetInstanceRecord;
use crate::core::widget::settings::WidgetSettings;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("settings encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl WidgetInstanceRecord {
    pub fn decode_settings(&self) -> Result<WidgetSettings, StorageError> {
        Ok(serde_json::from_str(&self.settings)?)
    }
}

/// Persists widget instances and their settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn create_instance(
        &self,
        widget_id: &str,
        settings: &WidgetSettings,
    ) -> Result<WidgetInstanceRecord, StorageError> {
        let encoded = serde_json::to_string(settings)?;
        let id = sqlx::query("INSERT INTO widget_instances (widget_id, settings) VALUES (?1, ?2)")
            .bind(widget_id)
            .bind(encoded)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        let record = sqlx::query_as::<_, WidgetInstanceRecord>(
            r#"
            SELECT id, widget_id, settings, created_at, updated_at
            FROM widget_instances
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn get_instance(&self, id: i64) -> Result<Option<WidgetInstanceRecord>, StorageError> {
        let row = sqlx::query_as::<_, WidgetInstanceRecord>(
            r#"
            SELECT id, widget_id, settings, created_at, updated_at
            FROM widget_instances
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrites the settings of an instance. Returns the number of rows
    /// touched, 0 when the instance does not exist.
    pub async fn save_settings(
        &self,
        id: i64,
        settings: &WidgetSettings,
    ) -> Result<u64, StorageError> {
        let encoded = serde_json::to_string(settings)?;
        let affected = sqlx::query(
            r#"
            UPDATE widget_instances
            SET settings = ?1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?2
            "#,
        )
        .bind(encoded)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected)
    }

    pub async fn delete_instance(&self, id: i64) -> Result<u64, StorageError> {
        let affected = sqlx::query("DELETE FROM widget_instances WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }
}
