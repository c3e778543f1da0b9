use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use lingua_core::achievements;
use lingua_core::model::{Percent, PhraseKey, ScenarioId, UserProgress, WordId};
use lingua_core::time::{Clock, DayPolicy};
use storage::repository::{ABSENT_VERSION, ProgressRepository, StorageError, Versioned};

use crate::error::ProgressStoreError;

/// Write attempts per mutation before giving up on a contended record.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Owner of the persisted `UserProgress` record.
///
/// Every mutator runs load, mutate, evaluate achievements and save against the record's version,
/// retrying on a lost race. Storage failures never reach the caller: they are logged and the
/// caller gets the in-memory result.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    days: DayPolicy,
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, days: DayPolicy, repo: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, days, repo }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn day_policy(&self) -> DayPolicy {
        self.days
    }

    /// Current progress, or the zero state if nothing is stored or the record cannot be read.
    ///
    /// A record that is present but undecodable is overwritten by the next mutation.
    pub async fn load(&self) -> UserProgress {
        self.load_versioned().await.value
    }

    /// Mark a scenario completed. Completing it again changes nothing and writes nothing.
    pub async fn complete_scenario(&self, scenario: &ScenarioId) -> UserProgress {
        self.mutate("complete_scenario", |progress, now, days| {
            progress.complete_scenario(scenario, now, days)
        })
        .await
    }

    pub async fn add_study_time(&self, minutes: u32) -> UserProgress {
        self.mutate("add_study_time", |progress, _, _| {
            progress.add_study_time(minutes);
            true
        })
        .await
    }

    /// Overwrite the score kept for a phrase.
    pub async fn update_pronunciation_score(
        &self,
        phrase: &PhraseKey,
        score: Percent,
    ) -> UserProgress {
        self.mutate("update_pronunciation_score", |progress, _, _| {
            progress.record_pronunciation(phrase.clone(), score);
            true
        })
        .await
    }

    /// Overwrite the mastery kept for a word.
    pub async fn update_vocabulary_mastery(&self, word: &WordId, mastery: Percent) -> UserProgress {
        self.mutate("update_vocabulary_mastery", |progress, _, _| {
            progress.record_vocabulary(word.clone(), mastery);
            true
        })
        .await
    }

    /// Drop every persisted key and return the zero state.
    pub async fn reset_all(&self) -> UserProgress {
        match self.repo.clear_all().await {
            Ok(()) => info!("all stored progress cleared"),
            Err(err) => warn!(error = %err, "failed to clear stored progress"),
        }
        UserProgress::default()
    }

    async fn load_versioned(&self) -> Versioned<UserProgress> {
        match self.repo.load_progress().await {
            Ok(Some(stored)) => stored,
            Ok(None) => Versioned {
                value: UserProgress::default(),
                version: ABSENT_VERSION,
            },
            // An unreadable record is replaced by the next save.
            Err(StorageError::Corrupt { version, message }) => {
                warn!(version, error = %message, "stored progress is unreadable, using defaults");
                Versioned {
                    value: UserProgress::default(),
                    version,
                }
            }
            // Saving against ABSENT_VERSION then conflicts rather than clobbering the record.
            Err(err) => {
                warn!(error = %err, "failed to load progress, using defaults");
                Versioned {
                    value: UserProgress::default(),
                    version: ABSENT_VERSION,
                }
            }
        }
    }

    async fn mutate<F>(&self, action: &'static str, apply: F) -> UserProgress
    where
        F: Fn(&mut UserProgress, DateTime<Utc>, &DayPolicy) -> bool + Send + Sync,
    {
        match self.try_mutate(action, &apply).await {
            Ok(progress) => progress,
            Err((progress, err)) => {
                warn!(action, error = %err, "progress not saved");
                progress
            }
        }
    }

    /// Runs the read-modify-write loop. On failure the error comes back with the last in-memory
    /// result so the caller can still show it.
    async fn try_mutate<F>(
        &self,
        action: &'static str,
        apply: &F,
    ) -> Result<UserProgress, (UserProgress, ProgressStoreError)>
    where
        F: Fn(&mut UserProgress, DateTime<Utc>, &DayPolicy) -> bool + Send + Sync,
    {
        let now = self.clock.now();
        let mut attempt = 1;
        loop {
            let Versioned {
                value: mut progress,
                version,
            } = self.load_versioned().await;

            if !apply(&mut progress, now, &self.days) {
                debug!(action, "no change, nothing to save");
                return Ok(progress);
            }

            for id in achievements::evaluate(&mut progress, now) {
                info!(achievement = %id, "achievement unlocked");
            }

            match self.repo.save_progress(&progress, version).await {
                Ok(saved) => {
                    debug!(action, version = saved, "progress saved");
                    return Ok(progress);
                }
                Err(StorageError::Conflict) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(action, attempt, "progress changed concurrently, retrying");
                    attempt += 1;
                }
                Err(StorageError::Conflict) => {
                    return Err((
                        progress,
                        ProgressStoreError::Contended { attempts: attempt },
                    ));
                }
                Err(err) => return Err((progress, err.into())),
            }
        }
    }
}
