use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{Flashcard, Percent};
use crate::scheduler::Scheduler;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingParseError {
    #[error("unknown rating `{0}` (expected easy, medium or hard)")]
    UnknownRating(String),
    #[error("unknown review mode `{0}` (expected all, due or learned)")]
    UnknownMode(String),
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// How hard the learner found a flashcard.
///
/// - `Easy`: recalled instantly, the interval grows and the ease factor rises
/// - `Medium`: recalled with effort, the interval grows at the current ease
/// - `Hard`: struggled, the card comes back tomorrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Easy,
    Medium,
    Hard,
}

impl Rating {
    /// Mastery recorded for the card's word after this rating.
    #[must_use]
    pub fn vocabulary_mastery(self) -> Percent {
        let value = match self {
            Rating::Easy => 100,
            Rating::Medium => 70,
            Rating::Hard => 40,
        };
        Percent::new(value).unwrap_or(Percent::ZERO)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Easy => "easy",
            Rating::Medium => "medium",
            Rating::Hard => "hard",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = RatingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Rating::Easy),
            "medium" => Ok(Rating::Medium),
            "hard" => Ok(Rating::Hard),
            _ => Err(RatingParseError::UnknownRating(s.to_owned())),
        }
    }
}

//
// ─── SELECTION ────────────────────────────────────────────────────────────────
//

/// Which cards a review session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewMode {
    #[default]
    All,
    Due,
    Learned,
}

impl FromStr for ReviewMode {
    type Err = RatingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ReviewMode::All),
            "due" => Ok(ReviewMode::Due),
            "learned" => Ok(ReviewMode::Learned),
            _ => Err(RatingParseError::UnknownMode(s.to_owned())),
        }
    }
}

/// Category and mode filter applied before a review session is shuffled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewFilter {
    pub mode: ReviewMode,
    pub category: Option<String>,
}

impl ReviewFilter {
    #[must_use]
    pub fn new(mode: ReviewMode) -> Self {
        Self {
            mode,
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns true if `card` belongs in a session built with this filter.
    #[must_use]
    pub fn admits(&self, card: &Flashcard, now: DateTime<Utc>, scheduler: &Scheduler) -> bool {
        if self
            .category
            .as_deref()
            .is_some_and(|category| category != card.category.as_str())
        {
            return false;
        }

        match self.mode {
            ReviewMode::All => true,
            ReviewMode::Due => scheduler.is_due(card, now),
            ReviewMode::Learned => card.is_learned,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DifficultyTier, FlashcardId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn card(category: &str) -> Flashcard {
        Flashcard::new(
            FlashcardId::new("v1").unwrap(),
            "cappuccino",
            "coffee with milk foam",
            category,
            DifficultyTier::Beginner,
        )
    }

    #[test]
    fn rating_parses_case_insensitively() {
        assert_eq!("Easy".parse::<Rating>().unwrap(), Rating::Easy);
        assert_eq!(" hard ".parse::<Rating>().unwrap(), Rating::Hard);
        assert!(matches!(
            "again".parse::<Rating>(),
            Err(RatingParseError::UnknownRating(_))
        ));
    }

    #[test]
    fn mastery_per_rating() {
        assert_eq!(Rating::Easy.vocabulary_mastery().value(), 100);
        assert_eq!(Rating::Medium.vocabulary_mastery().value(), 70);
        assert_eq!(Rating::Hard.vocabulary_mastery().value(), 40);
    }

    #[test]
    fn category_filter_runs_before_mode() {
        let scheduler = Scheduler::default();
        let filter = ReviewFilter::new(ReviewMode::All).with_category("food");
        assert!(filter.admits(&card("food"), fixed_now(), &scheduler));
        assert!(!filter.admits(&card("drinks"), fixed_now(), &scheduler));
    }

    #[test]
    fn due_mode_uses_interval() {
        let scheduler = Scheduler::default();
        let filter = ReviewFilter::new(ReviewMode::Due);
        let now = fixed_now();

        let fresh = card("food");
        assert!(filter.admits(&fresh, now, &scheduler));

        let mut reviewed = card("food");
        reviewed.last_reviewed = Some(now - Duration::hours(20));
        reviewed.interval = 1;
        assert!(!filter.admits(&reviewed, now, &scheduler));

        reviewed.last_reviewed = Some(now - Duration::days(1));
        assert!(filter.admits(&reviewed, now, &scheduler));
    }

    #[test]
    fn learned_mode_only_keeps_learned_cards() {
        let scheduler = Scheduler::default();
        let filter = ReviewFilter::new(ReviewMode::Learned);
        let mut learned = card("food");
        learned.is_learned = true;
        assert!(filter.admits(&learned, fixed_now(), &scheduler));
        assert!(!filter.admits(&card("food"), fixed_now(), &scheduler));
    }

    #[test]
    fn review_mode_parses() {
        assert_eq!("due".parse::<ReviewMode>().unwrap(), ReviewMode::Due);
        assert!("weekly".parse::<ReviewMode>().is_err());
    }
}
