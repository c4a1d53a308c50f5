use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{KeyValueRepository, StorageError};

use super::SqliteRepository;

#[async_trait]
impl KeyValueRepository for SqliteRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM key_values WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(value))
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        for (key, value) in entries {
            sqlx::query(
                r"
                INSERT INTO key_values (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(*key)
            .bind(value.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        tracing::debug!(count = entries.len(), "stored key/value entries");
        Ok(())
    }
}
