use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::repository::Storage;

mod kv_repo;
mod migrate;

/// A private in-memory database lives only as long as its connection.
const PRIVATE_MEMORY_URL: &str = "sqlite::memory:";

/// Key-value store over one `kv_store` table.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Open the database at `database_url`, creating the file if needed.
    ///
    /// File databases run in WAL mode with a 5 second busy timeout. `sqlite::memory:` is held on
    /// a single connection that is never recycled, so every query sees the same database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the URL is invalid or the database cannot be opened.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let private_memory = database_url == PRIVATE_MEMORY_URL;
        let mut pool = SqlitePoolOptions::new()
            .max_connections(if private_memory { 1 } else { 5 })
            .acquire_timeout(Duration::from_secs(5));
        if private_memory {
            pool = pool.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool.connect_with(options).await?;
        debug!(url = database_url, "sqlite pool ready");
        Ok(Self { pool })
    }

    /// Bring the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Migrated `SQLite` storage for both typed repositories.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migration fails.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        Ok(Self::from_store(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ABSENT_VERSION, KeyValueStore};

    #[tokio::test]
    async fn private_memory_database_survives_across_calls() {
        let repo = SqliteRepository::connect(PRIVATE_MEMORY_URL).await.unwrap();
        repo.migrate().await.unwrap();

        let mut version = ABSENT_VERSION;
        for value in ["one", "two", "three"] {
            version = repo.put("k", value.into(), version).await.unwrap();
        }

        let stored = repo.get("k").await.unwrap().unwrap();
        assert_eq!(stored.value, "three");
        assert_eq!(stored.version, 3);
    }
}
