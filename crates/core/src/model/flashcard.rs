use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::{FlashcardId, WordId};

/// Ease factor given to a card that has never been reviewed.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Interval (in days) given to a card that has never been reviewed.
pub const INITIAL_INTERVAL_DAYS: u32 = 1;

//
// ─── DIFFICULTY TIER ───────────────────────────────────────────────────────────
//

/// Static difficulty tier of the card content (not the learner's rating).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DifficultyTier::Beginner => "beginner",
            DifficultyTier::Intermediate => "intermediate",
            DifficultyTier::Advanced => "advanced",
        })
    }
}

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A vocabulary flashcard together with its spaced-repetition state.
///
/// Scheduling fields (`ease_factor`, `interval`, `review_count`, `last_reviewed`,
/// `is_learned`) only change through [`crate::scheduler::Scheduler::rate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: FlashcardId,
    pub front: String,
    pub back: String,
    pub category: String,
    pub difficulty: DifficultyTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub is_learned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    #[serde(default = "default_interval")]
    pub interval: u32,
}

fn default_ease_factor() -> f64 {
    INITIAL_EASE_FACTOR
}

fn default_interval() -> u32 {
    INITIAL_INTERVAL_DAYS
}

impl Flashcard {
    /// Creates a card that has never been reviewed.
    #[must_use]
    pub fn new(
        id: FlashcardId,
        front: impl Into<String>,
        back: impl Into<String>,
        category: impl Into<String>,
        difficulty: DifficultyTier,
    ) -> Self {
        Self {
            id,
            front: front.into(),
            back: back.into(),
            category: category.into(),
            difficulty,
            example: None,
            audio_url: None,
            is_learned: false,
            last_reviewed: None,
            review_count: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: INITIAL_INTERVAL_DAYS,
        }
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio_url: impl Into<String>) -> Self {
        self.audio_url = Some(audio_url.into());
        self
    }

    /// Word whose mastery is updated when this card is rated.
    #[must_use]
    pub fn word_id(&self) -> WordId {
        WordId::from(&self.id)
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.last_reviewed.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
