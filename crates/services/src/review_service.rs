use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use lingua_core::{
    model::{Flashcard, FlashcardId, Rating, UserProgress},
    scheduler::Scheduler,
    time::Clock,
};

use crate::flashcard_store::FlashcardStore;
use crate::progress_store::ProgressStore;

//
// ─── REVIEW RESULT ─────────────────────────────────────────────────────────────
//

/// Outcome of rating one card: the rescheduled card and the progress after the
/// card's word mastery was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedCard {
    pub card: Flashcard,
    pub progress: UserProgress,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Coordinates applying a rating to a card and recording the learner's mastery.
#[derive(Clone)]
pub struct ReviewService {
    clock: Clock,
    scheduler: Scheduler,
    flashcards: Arc<FlashcardStore>,
    progress: Arc<ProgressStore>,
}

impl ReviewService {
    #[must_use]
    pub fn new(clock: Clock, flashcards: Arc<FlashcardStore>, progress: Arc<ProgressStore>) -> Self {
        Self {
            clock,
            scheduler: flashcards.scheduler().clone(),
            flashcards,
            progress,
        }
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Rate the card with `id`.
    ///
    /// Reschedules the card, stores it, then writes the rating's mastery for the card's word.
    /// Returns `None` if no card has that id.
    pub async fn rate(&self, id: &FlashcardId, rating: Rating) -> Option<RatedCard> {
        let card = self.flashcards.find(id).await?;
        Some(self.rate_card(&card, rating).await)
    }

    /// Rate a card the caller already holds.
    pub async fn rate_card(&self, card: &Flashcard, rating: Rating) -> RatedCard {
        let rated = self.scheduler.rate(card, rating, self.now());
        debug!(
            card = %rated.id,
            %rating,
            interval = rated.interval,
            ease = rated.ease_factor,
            learned = rated.is_learned,
            "card rated"
        );

        self.flashcards.update(&rated).await;
        let progress = self
            .progress
            .update_vocabulary_mastery(&rated.word_id(), rating.vocabulary_mastery())
            .await;

        RatedCard {
            card: rated,
            progress,
        }
    }
}
