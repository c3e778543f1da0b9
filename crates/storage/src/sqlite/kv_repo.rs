use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::mapping::{version_from_i64, version_to_i64};
use crate::repository::{ABSENT_VERSION, KeyValueStore, StorageError, StoredValue};

use super::SqliteRepository;

fn conn(err: sqlx::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let row = sqlx::query("SELECT value, version FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let version: i64 = row
            .try_get("version")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StoredValue {
            value,
            version: version_from_i64(version)?,
        }))
    }

    async fn put(
        &self,
        key: &str,
        value: String,
        expected_version: u64,
    ) -> Result<u64, StorageError> {
        let next = expected_version
            .checked_add(1)
            .ok_or_else(|| StorageError::Serialization("version overflow".into()))?;
        let next_db = version_to_i64(next)?;

        let result = if expected_version == ABSENT_VERSION {
            sqlx::query(
                r"
                INSERT INTO kv_store (key, value, version, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(key) DO NOTHING
                ",
            )
            .bind(key)
            .bind(&value)
            .bind(next_db)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(conn)?
        } else {
            sqlx::query(
                r"
                UPDATE kv_store
                SET value = ?1, version = ?2, updated_at = ?3
                WHERE key = ?4 AND version = ?5
                ",
            )
            .bind(&value)
            .bind(next_db)
            .bind(Utc::now())
            .bind(key)
            .bind(version_to_i64(expected_version)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?
        };

        if result.rows_affected() != 1 {
            debug!(key, expected_version, "kv_store write lost a version race");
            return Err(StorageError::Conflict);
        }

        debug!(key, version = next, "kv_store write");
        Ok(next)
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        debug!(count = keys.len(), "kv_store keys removed");
        Ok(())
    }
}
