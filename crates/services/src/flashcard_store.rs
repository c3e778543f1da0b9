use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use lingua_core::catalog;
use lingua_core::model::{Flashcard, FlashcardId, ReviewFilter};
use lingua_core::scheduler::Scheduler;
use lingua_core::time::Clock;
use storage::repository::{ABSENT_VERSION, FlashcardRepository, StorageError, Versioned};

use crate::error::FlashcardStoreError;
use crate::progress_store::MAX_WRITE_ATTEMPTS;

/// Owner of the persisted flashcard collection.
#[derive(Clone)]
pub struct FlashcardStore {
    clock: Clock,
    scheduler: Scheduler,
    repo: Arc<dyn FlashcardRepository>,
}

impl FlashcardStore {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn FlashcardRepository>) -> Self {
        Self {
            clock,
            scheduler: Scheduler::default(),
            repo,
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The whole collection.
    ///
    /// The first call on an empty store writes the seed catalog. If storage cannot be read
    /// the seed catalog is returned instead.
    pub async fn get_all(&self) -> Vec<Flashcard> {
        match self.repo.load_flashcards().await {
            Ok(Some(stored)) => stored.value,
            Ok(None) => self.seed().await,
            Err(err) => {
                warn!(error = %err, "failed to load flashcards, using seed catalog");
                catalog::seed_flashcards()
            }
        }
    }

    pub async fn find(&self, id: &FlashcardId) -> Option<Flashcard> {
        self.get_all().await.into_iter().find(|card| &card.id == id)
    }

    /// Cards admitted by `filter`, in random order.
    pub async fn select(&self, filter: &ReviewFilter) -> Vec<Flashcard> {
        let now = self.clock.now();
        let mut cards: Vec<Flashcard> = self
            .get_all()
            .await
            .into_iter()
            .filter(|card| filter.admits(card, now, &self.scheduler))
            .collect();
        cards.shuffle(&mut rng());
        cards
    }

    /// Distinct categories in collection order.
    pub async fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for card in self.get_all().await {
            if !categories.contains(&card.category) {
                categories.push(card.category);
            }
        }
        categories
    }

    /// Replace the stored card with the same id.
    ///
    /// Returns true only when the card was found and the collection saved. A failed write is
    /// logged and returns false.
    pub async fn update(&self, card: &Flashcard) -> bool {
        match self.try_update(card).await {
            Ok(saved) => saved,
            Err(err) => {
                warn!(card = %card.id, error = %err, "flashcard update not saved");
                false
            }
        }
    }

    async fn try_update(&self, card: &Flashcard) -> Result<bool, FlashcardStoreError> {
        let mut attempt = 1;
        loop {
            let Versioned {
                value: mut cards,
                version,
            } = self.load_versioned().await;

            let Some(slot) = cards.iter_mut().find(|stored| stored.id == card.id) else {
                debug!(card = %card.id, "no card with this id");
                return Ok(false);
            };
            *slot = card.clone();

            match self.repo.save_flashcards(&cards, version).await {
                Ok(saved) => {
                    debug!(card = %card.id, version = saved, "flashcard saved");
                    return Ok(true);
                }
                Err(StorageError::Conflict) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(card = %card.id, attempt, "flashcards changed concurrently, retrying");
                    attempt += 1;
                }
                Err(StorageError::Conflict) => {
                    return Err(FlashcardStoreError::Contended { attempts: attempt });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn load_versioned(&self) -> Versioned<Vec<Flashcard>> {
        let absent = || Versioned {
            value: catalog::seed_flashcards(),
            version: ABSENT_VERSION,
        };
        match self.repo.load_flashcards().await {
            Ok(Some(stored)) => stored,
            Ok(None) => absent(),
            // The next save replaces the unreadable collection.
            Err(StorageError::Corrupt { version, message }) => {
                warn!(version, error = %message, "stored flashcards are unreadable, using seed catalog");
                Versioned {
                    value: catalog::seed_flashcards(),
                    version,
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load flashcards, using seed catalog");
                absent()
            }
        }
    }

    async fn seed(&self) -> Vec<Flashcard> {
        let cards = catalog::seed_flashcards();
        match self.repo.save_flashcards(&cards, ABSENT_VERSION).await {
            Ok(_) => info!(count = cards.len(), "seeded flashcard catalog"),
            Err(StorageError::Conflict) => {
                // Someone else seeded first; theirs wins.
                if let Ok(Some(stored)) = self.repo.load_flashcards().await {
                    return stored.value;
                }
            }
            Err(err) => warn!(error = %err, "failed to persist seed catalog"),
        }
        cards
    }
}
