use std::sync::Arc;

use lingua_core::time::DayPolicy;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::flashcard_store::FlashcardStore;
use crate::progress_store::ProgressStore;
use crate::pronunciation::{MockScorer, PronunciationScorer, PronunciationService};
use crate::review_service::ReviewService;
use crate::speech::Narrator;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    progress: Arc<ProgressStore>,
    flashcards: Arc<FlashcardStore>,
    reviews: Arc<ReviewService>,
    pronunciation: Arc<PronunciationService>,
    narrator: Narrator,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn sqlite(
        db_url: &str,
        clock: Clock,
        days: DayPolicy,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, days))
    }

    /// Build services over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, days: DayPolicy) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, days)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, days: DayPolicy) -> Self {
        let progress = Arc::new(ProgressStore::new(
            clock,
            days,
            Arc::clone(&storage.progress),
        ));
        let flashcards = Arc::new(FlashcardStore::new(clock, Arc::clone(&storage.flashcards)));
        let reviews = Arc::new(ReviewService::new(
            clock,
            Arc::clone(&flashcards),
            Arc::clone(&progress),
        ));
        let scorer: Arc<dyn PronunciationScorer> = Arc::new(MockScorer);
        let pronunciation = Arc::new(PronunciationService::new(scorer, Arc::clone(&progress)));

        Self {
            clock,
            progress,
            flashcards,
            reviews,
            pronunciation,
            narrator: Narrator::silent(),
        }
    }

    /// Swap the pronunciation scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn PronunciationScorer>) -> Self {
        self.pronunciation = Arc::new(PronunciationService::new(
            scorer,
            Arc::clone(&self.progress),
        ));
        self
    }

    #[must_use]
    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = narrator;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn flashcards(&self) -> Arc<FlashcardStore> {
        Arc::clone(&self.flashcards)
    }

    #[must_use]
    pub fn reviews(&self) -> Arc<ReviewService> {
        Arc::clone(&self.reviews)
    }

    #[must_use]
    pub fn pronunciation(&self) -> Arc<PronunciationService> {
        Arc::clone(&self.pronunciation)
    }

    #[must_use]
    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }
}
