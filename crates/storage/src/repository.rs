use async_trait::async_trait;
use lingua_core::model::{Flashcard, UserProgress};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::mapping;

/// Keys of the persisted values.
pub mod keys {
    pub const USER_PROGRESS: &str = "userProgress";
    pub const FLASHCARDS: &str = "flashcards";
    /// Reserved; never written by the core.
    pub const SETTINGS: &str = "settings";

    pub const ALL: [&str; 3] = [USER_PROGRESS, FLASHCARDS, SETTINGS];
}

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A value exists but cannot be decoded. `version` is the version it was stored at, so a
    /// caller may overwrite it.
    #[error("stored value at version {version} is unreadable: {message}")]
    Corrupt { version: u64, message: String },
}

/// Decode a stored value, reporting decode failures together with the stored version.
fn decode_stored<T: serde::de::DeserializeOwned>(stored: &StoredValue) -> Result<T, StorageError> {
    mapping::decode(&stored.value).map_err(|err| StorageError::Corrupt {
        version: stored.version,
        message: err.to_string(),
    })
}

/// Raw persisted value with its write version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: String,
    pub version: u64,
}

/// A decoded value together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Version of a key that has never been written.
pub const ABSENT_VERSION: u64 = 0;

/// Key-value contract over serialized blobs.
///
/// Writes are conditional: `put` succeeds only when the stored version equals
/// `expected_version` (`ABSENT_VERSION` for a key that must not exist yet).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value and its version.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError>;

    /// Write a value if nobody else wrote it since `expected_version`.
    ///
    /// Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on a version mismatch, or other storage errors.
    async fn put(&self, key: &str, value: String, expected_version: u64)
    -> Result<u64, StorageError>;

    /// Remove the given keys. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Typed access to the learner's progress record.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the stored progress, normalized against the achievement catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failure.
    async fn load_progress(&self) -> Result<Option<Versioned<UserProgress>>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the record changed since `expected_version`.
    async fn save_progress(
        &self,
        progress: &UserProgress,
        expected_version: u64,
    ) -> Result<u64, StorageError>;

    /// Remove every persisted key (progress, flashcards and settings).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

/// Typed access to the flashcard collection.
#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failure.
    async fn load_flashcards(&self) -> Result<Option<Versioned<Vec<Flashcard>>>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the collection changed since `expected_version`.
    async fn save_flashcards(
        &self,
        cards: &[Flashcard],
        expected_version: u64,
    ) -> Result<u64, StorageError>;
}

#[async_trait]
impl<S: KeyValueStore> ProgressRepository for S {
    async fn load_progress(&self) -> Result<Option<Versioned<UserProgress>>, StorageError> {
        let Some(stored) = self.get(keys::USER_PROGRESS).await? else {
            return Ok(None);
        };
        let progress: UserProgress = decode_stored(&stored)?;
        Ok(Some(Versioned {
            value: progress.normalized(),
            version: stored.version,
        }))
    }

    async fn save_progress(
        &self,
        progress: &UserProgress,
        expected_version: u64,
    ) -> Result<u64, StorageError> {
        let encoded = mapping::encode(progress)?;
        self.put(keys::USER_PROGRESS, encoded, expected_version).await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        self.remove(&keys::ALL).await
    }
}

#[async_trait]
impl<S: KeyValueStore> FlashcardRepository for S {
    async fn load_flashcards(&self) -> Result<Option<Versioned<Vec<Flashcard>>>, StorageError> {
        let Some(stored) = self.get(keys::FLASHCARDS).await? else {
            return Ok(None);
        };
        Ok(Some(Versioned {
            value: decode_stored(&stored)?,
            version: stored.version,
        }))
    }

    async fn save_flashcards(
        &self,
        cards: &[Flashcard],
        expected_version: u64,
    ) -> Result<u64, StorageError> {
        let encoded = mapping::encode(cards)?;
        self.put(keys::FLASHCARDS, encoded, expected_version).await
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, StoredValue>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        value: String,
        expected_version: u64,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let current = guard.get(key).map_or(ABSENT_VERSION, |stored| stored.version);
        if current != expected_version {
            return Err(StorageError::Conflict);
        }
        let version = current + 1;
        guard.insert(key.to_owned(), StoredValue { value, version });
        Ok(version)
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub flashcards: Arc<dyn FlashcardRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }

    /// Build a `Storage` whose repositories all share one key-value backend.
    #[must_use]
    pub fn from_store<S>(store: S) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let progress: Arc<dyn ProgressRepository> = Arc::new(store.clone());
        let flashcards: Arc<dyn FlashcardRepository> = Arc::new(store);
        Self {
            progress,
            flashcards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::catalog;
    use lingua_core::model::ScenarioId;
    use lingua_core::time::{DayPolicy, fixed_now};

    #[tokio::test]
    async fn put_enforces_expected_version() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.put("k", "a".into(), ABSENT_VERSION).await.unwrap(), 1);
        assert!(matches!(
            repo.put("k", "b".into(), ABSENT_VERSION).await,
            Err(StorageError::Conflict)
        ));
        assert_eq!(repo.put("k", "b".into(), 1).await.unwrap(), 2);

        let stored = repo.get("k").await.unwrap().unwrap();
        assert_eq!(stored.value, "b");
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn round_trips_progress() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_progress().await.unwrap().is_none());

        let mut progress = UserProgress::default();
        progress.complete_scenario(
            &ScenarioId::new("cafe-1").unwrap(),
            fixed_now(),
            &DayPolicy::utc(),
        );
        let version = repo.save_progress(&progress, ABSENT_VERSION).await.unwrap();

        let loaded = repo.load_progress().await.unwrap().unwrap();
        assert_eq!(loaded.version, version);
        assert_eq!(loaded.value, progress);
    }

    #[tokio::test]
    async fn round_trips_flashcards() {
        let repo = InMemoryRepository::new();
        let cards = catalog::seed_flashcards();
        repo.save_flashcards(&cards, ABSENT_VERSION).await.unwrap();

        let loaded = repo.load_flashcards().await.unwrap().unwrap();
        assert_eq!(loaded.value, cards);
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn malformed_payload_reports_its_version() {
        let repo = InMemoryRepository::new();
        repo.put(keys::FLASHCARDS, "{not json".into(), ABSENT_VERSION)
            .await
            .unwrap();
        assert!(matches!(
            repo.load_flashcards().await,
            Err(StorageError::Corrupt { version: 1, .. })
        ));

        repo.put(keys::USER_PROGRESS, r#"{"score":"lots"}"#.into(), ABSENT_VERSION)
            .await
            .unwrap();
        assert!(matches!(
            repo.load_progress().await,
            Err(StorageError::Corrupt { version: 1, .. })
        ));
    }

    #[tokio::test]
    async fn clear_all_removes_every_key() {
        let repo = InMemoryRepository::new();
        for key in keys::ALL {
            repo.put(key, "{}".into(), ABSENT_VERSION).await.unwrap();
        }
        repo.clear_all().await.unwrap();
        for key in keys::ALL {
            assert!(repo.get(key).await.unwrap().is_none());
        }
    }
}
