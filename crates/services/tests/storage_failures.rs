//! Storage failures never reach the learner: every call still returns a usable value and the
//! failure only shows up in logs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use lingua_core::catalog;
use lingua_core::model::{FlashcardId, Rating, ScenarioId};
use lingua_core::time::{DayPolicy, fixed_clock};
use services::progress_store::MAX_WRITE_ATTEMPTS;
use services::{AppServices, ProgressStore};
use storage::repository::{
    ABSENT_VERSION, FlashcardRepository, InMemoryRepository, KeyValueStore, ProgressRepository,
    Storage, StorageError, StoredValue, keys,
};

#[derive(Clone, Default)]
struct FlakyStore {
    inner: InMemoryRepository,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    always_conflict: Arc<AtomicBool>,
    puts: Arc<AtomicU32>,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("disk unplugged".into()));
        }
        self.inner.get(key).await
    }

    async fn put(
        &self,
        key: &str,
        value: String,
        expected_version: u64,
    ) -> Result<u64, StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("disk full".into()));
        }
        if self.always_conflict.load(Ordering::SeqCst) {
            return Err(StorageError::Conflict);
        }
        self.inner.put(key, value, expected_version).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.remove(keys).await
    }
}

fn app(store: &FlakyStore) -> AppServices {
    AppServices::from_storage(
        &Storage::from_store(store.clone()),
        fixed_clock(),
        DayPolicy::utc(),
    )
}

#[tokio::test]
async fn failed_write_still_returns_updated_progress() {
    let store = FlakyStore::default();
    store.fail_writes.store(true, Ordering::SeqCst);

    let progress = app(&store)
        .progress()
        .complete_scenario(&ScenarioId::new("cafe-1").unwrap())
        .await;

    assert_eq!(progress.score, 100);
    assert!(progress.achievements[0].unlocked);
    assert!(store.inner.load_progress().await.unwrap().is_none());
}

#[tokio::test]
async fn failed_read_does_not_clobber_stored_progress() {
    let store = FlakyStore::default();
    let services = app(&store);
    services.progress().add_study_time(40).await;

    store.fail_reads.store(true, Ordering::SeqCst);
    let fallback = services.progress().add_study_time(5).await;
    assert_eq!(fallback.total_study_time, 5);

    store.fail_reads.store(false, Ordering::SeqCst);
    assert_eq!(services.progress().load().await.total_study_time, 40);
}

#[tokio::test]
async fn contended_record_gives_up_after_bounded_attempts() {
    let store = FlakyStore::default();
    store.always_conflict.store(true, Ordering::SeqCst);
    let progress = ProgressStore::new(
        fixed_clock(),
        DayPolicy::utc(),
        Arc::new(store.clone()) as Arc<dyn ProgressRepository>,
    );

    let result = progress.add_study_time(15).await;
    assert_eq!(result.total_study_time, 15);
    assert_eq!(store.puts.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
}

#[tokio::test]
async fn unreadable_flashcards_fall_back_to_seed_catalog() {
    let store = FlakyStore::default();
    store.fail_reads.store(true, Ordering::SeqCst);

    let cards = app(&store).flashcards().get_all().await;
    assert_eq!(cards, catalog::seed_flashcards());
}

#[tokio::test]
async fn rating_survives_a_failing_store() {
    let store = FlakyStore::default();
    store.fail_writes.store(true, Ordering::SeqCst);

    let rated = app(&store)
        .reviews()
        .rate(&FlashcardId::new("v4").unwrap(), Rating::Easy)
        .await
        .unwrap();
    assert_eq!(rated.card.review_count, 1);
    assert_eq!(rated.progress.vocabulary_mastery.len(), 1);
}

#[tokio::test]
async fn failed_reset_still_returns_zero_state() {
    let store = FlakyStore::default();
    let services = app(&store);
    services.progress().add_study_time(40).await;

    store.fail_writes.store(true, Ordering::SeqCst);
    let reset = services.progress().reset_all().await;
    assert_eq!(reset.total_study_time, 0);
}

#[tokio::test]
async fn garbled_progress_record_is_overwritten_by_new_progress() {
    let store = FlakyStore::default();
    store
        .inner
        .put(keys::USER_PROGRESS, "{not json".into(), ABSENT_VERSION)
        .await
        .unwrap();
    let services = app(&store);

    services
        .progress()
        .complete_scenario(&ScenarioId::new("cafe-1").unwrap())
        .await;
    let progress = services
        .progress()
        .complete_scenario(&ScenarioId::new("airport-1").unwrap())
        .await;
    assert_eq!(progress.score, 200);
    assert_eq!(progress.completed_scenarios.len(), 2);

    let stored = store.inner.load_progress().await.unwrap().unwrap();
    assert_eq!(stored.value, progress);
    assert_eq!(services.progress().load().await.score, 200);
}

#[tokio::test]
async fn garbled_flashcards_are_overwritten_by_ratings() {
    let store = FlakyStore::default();
    store
        .inner
        .put(keys::FLASHCARDS, "{not json".into(), ABSENT_VERSION)
        .await
        .unwrap();
    let reviews = app(&store).reviews();
    let v1 = FlashcardId::new("v1").unwrap();

    reviews.rate(&v1, Rating::Easy).await.unwrap();
    let rated = reviews.rate(&v1, Rating::Easy).await.unwrap();
    assert_eq!(rated.card.review_count, 2);

    let stored = store.inner.load_flashcards().await.unwrap().unwrap();
    let card = stored.value.iter().find(|card| card.id == v1).unwrap();
    assert_eq!(card.review_count, 2);
}

#[tokio::test]
async fn failed_flashcard_write_reports_not_saved() {
    let store = FlakyStore::default();
    let flashcards = app(&store).flashcards();
    let mut card = flashcards.get_all().await.remove(0);
    card.review_count += 1;

    store.fail_writes.store(true, Ordering::SeqCst);
    assert!(!flashcards.update(&card).await);

    store.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(flashcards.find(&card.id).await.unwrap().review_count, 0);
    assert!(flashcards.update(&card).await);
}
