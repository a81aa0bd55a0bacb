use sqlx::Row;

use super::SqliteRepository;
use super::mapping::ser;
use crate::repository::{SettingsRepository, StorageError};

#[async_trait::async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_setting(&self, key: &str) -> Result<Option<f64>, StorageError> {
        let row = sqlx::query("SELECT value FROM global_settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| r.try_get::<f64, _>("value").map_err(ser)).transpose()
    }

    async fn upsert_setting(&self, key: &str, value: f64) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO global_settings (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
