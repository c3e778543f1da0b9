use lingua_core::model::{Flashcard, Rating, ReviewFilter};
use tracing::debug;

use crate::error::ReviewSessionError;
use crate::flashcard_store::FlashcardStore;
use crate::review_service::{RatedCard, ReviewService};

/// One pass over a shuffled selection of cards.
///
/// Answering a card rates it through `ReviewService` and moves on. After the last card the
/// session is complete; `restart` walks the same cards again from the top.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    queue: Vec<Flashcard>,
    position: usize,
    reviewed: usize,
}

impl ReviewSession {
    /// Start a session over the cards `filter` admits.
    ///
    /// # Errors
    ///
    /// Returns `ReviewSessionError::Empty` if nothing matches.
    pub async fn start(
        flashcards: &FlashcardStore,
        filter: &ReviewFilter,
    ) -> Result<Self, ReviewSessionError> {
        Self::from_cards(flashcards.select(filter).await)
    }

    /// # Errors
    ///
    /// Returns `ReviewSessionError::Empty` if `cards` is empty.
    pub fn from_cards(cards: Vec<Flashcard>) -> Result<Self, ReviewSessionError> {
        if cards.is_empty() {
            return Err(ReviewSessionError::Empty);
        }
        Ok(Self {
            queue: cards,
            position: 0,
            reviewed: 0,
        })
    }

    #[must_use]
    pub fn current(&self) -> Option<&Flashcard> {
        self.queue.get(self.position)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.position >= self.queue.len()
    }

    /// Ratings given since the session started, across restarts.
    #[must_use]
    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Rate the current card and advance.
    ///
    /// # Errors
    ///
    /// Returns `ReviewSessionError::Completed` once every card has been answered.
    pub async fn answer(
        &mut self,
        reviews: &ReviewService,
        rating: Rating,
    ) -> Result<RatedCard, ReviewSessionError> {
        let card = self.current().ok_or(ReviewSessionError::Completed)?;
        let rated = reviews.rate_card(card, rating).await;

        // The queue keeps the rescheduled card so a restart rates from the new state.
        self.queue[self.position] = rated.card.clone();
        self.position += 1;
        self.reviewed += 1;
        debug!(
            position = self.position,
            total = self.queue.len(),
            "session advanced"
        );
        Ok(rated)
    }

    /// Go back to the first card.
    pub fn restart(&mut self) {
        self.position = 0;
    }
}
