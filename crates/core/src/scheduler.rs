use chrono::{DateTime, Utc};

use crate::model::{Flashcard, Rating};

/// Decimal places kept in `interval × ease` before rounding up, so float noise such as
/// `5 × 2.8000000000000003 = 14.000000000000002` does not push a card out by an extra day.
const INTERVAL_PRECISION: f64 = 1_000_000.0;

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Simplified SM-2 scheduler for flashcards.
///
/// - `Easy` raises the ease factor by `easy_bonus`, then multiplies the interval by it
/// - `Medium` multiplies the interval by the current ease factor
/// - `Hard` lowers the ease factor by `hard_penalty` and brings the card back tomorrow
///
/// The ease factor never drops below `minimum_ease` and the interval never drops below one day.
/// A card counts as learned once it has `learned_after_reviews` reviews and the latest one
/// was rated easy.
///
/// # Examples
///
/// ```
/// # use lingua_core::model::{DifficultyTier, Flashcard, FlashcardId, Rating};
/// # use lingua_core::scheduler::Scheduler;
/// let card = Flashcard::new(
///     FlashcardId::new("v1").unwrap(),
///     "cappuccino",
///     "espresso with steamed milk foam",
///     "drinks",
///     DifficultyTier::Beginner,
/// );
///
/// let rated = Scheduler::default().rate(&card, Rating::Medium, chrono::Utc::now());
/// assert_eq!(rated.interval, 3);
/// assert_eq!(rated.review_count, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler {
    pub minimum_ease: f64,
    pub easy_bonus: f64,
    pub hard_penalty: f64,
    pub learned_after_reviews: u32,
    pub max_interval_days: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            minimum_ease: 1.3,
            easy_bonus: 0.1,
            hard_penalty: 0.2,
            learned_after_reviews: 3,
            max_interval_days: 36_500,
        }
    }
}

impl Scheduler {
    /// Apply a rating to `card` and return the rescheduled card.
    ///
    /// The input card is not modified; identity and content fields are carried over.
    #[must_use]
    pub fn rate(&self, card: &Flashcard, rating: Rating, reviewed_at: DateTime<Utc>) -> Flashcard {
        let (ease_factor, interval) = match rating {
            Rating::Easy => {
                let ease = self.floor_ease(card.ease_factor + self.easy_bonus);
                (ease, self.grow_interval(card.interval, ease))
            }
            Rating::Medium => {
                let ease = self.floor_ease(card.ease_factor);
                (ease, self.grow_interval(card.interval, ease))
            }
            Rating::Hard => (self.floor_ease(card.ease_factor - self.hard_penalty), 1),
        };

        let review_count = card.review_count.saturating_add(1);

        Flashcard {
            ease_factor,
            interval,
            review_count,
            last_reviewed: Some(reviewed_at),
            is_learned: rating == Rating::Easy && review_count >= self.learned_after_reviews,
            ..card.clone()
        }
    }

    /// Whole days elapsed since the card was last reviewed, or `None` if it never was.
    #[must_use]
    pub fn days_since_review(&self, card: &Flashcard, now: DateTime<Utc>) -> Option<i64> {
        card.last_reviewed
            .map(|last| now.signed_duration_since(last).num_days())
    }

    /// A card is due if it was never reviewed or its interval has elapsed.
    #[must_use]
    pub fn is_due(&self, card: &Flashcard, now: DateTime<Utc>) -> bool {
        match self.days_since_review(card, now) {
            None => true,
            Some(days) => days >= i64::from(card.interval),
        }
    }

    fn floor_ease(&self, ease: f64) -> f64 {
        if ease.is_finite() {
            ease.max(self.minimum_ease)
        } else {
            self.minimum_ease
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn grow_interval(&self, interval: u32, ease: f64) -> u32 {
        let raw = f64::from(interval.max(1)) * ease;
        let days = ((raw * INTERVAL_PRECISION).round() / INTERVAL_PRECISION).ceil();
        // `as` saturates; the clamp keeps the result inside [1, max].
        (days as u32).clamp(1, self.max_interval_days.max(1))
    }
}

/// Rate a card with the default scheduler.
#[must_use]
pub fn rate(card: &Flashcard, rating: Rating, reviewed_at: DateTime<Utc>) -> Flashcard {
    Scheduler::default().rate(card, rating, reviewed_at)
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

    fn fresh_card() -> Flashcard {
        Flashcard::new(
            FlashcardId::new("v1").unwrap(),
            "cappuccino",
            "An Italian coffee drink",
            "drinks",
            DifficultyTier::Beginner,
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn medium_on_fresh_card() {
        let rated = rate(&fresh_card(), Rating::Medium, fixed_now());
        assert_eq!(rated.interval, 3);
        assert!(approx(rated.ease_factor, 2.5));
        assert_eq!(rated.review_count, 1);
        assert!(!rated.is_learned);
        assert_eq!(rated.last_reviewed, Some(fixed_now()));
    }

    #[test]
    fn easy_raises_ease_then_grows_interval() {
        let rated = rate(&fresh_card(), Rating::Easy, fixed_now());
        assert!(approx(rated.ease_factor, 2.6));
        assert_eq!(rated.interval, 3);

        let again = rate(&rated, Rating::Easy, fixed_now());
        assert!(approx(again.ease_factor, 2.7));
        // ceil(3 * 2.7) = ceil(8.1)
        assert_eq!(again.interval, 9);
    }

    #[test]
    fn interval_ignores_float_noise() {
        let mut card = fresh_card();
        card.interval = 5;
        card.ease_factor = 2.5 + 0.1 + 0.1;
        // ease becomes 2.8000000000000003 and 5 * ease = 14.000000000000002
        let rated = rate(&card, Rating::Easy, fixed_now());
        assert_eq!(rated.interval, 14);
    }

    #[test]
    fn hard_resets_interval_and_lowers_ease() {
        let mut card = fresh_card();
        card.interval = 40;
        card.ease_factor = 2.0;

        let rated = rate(&card, Rating::Hard, fixed_now());
        assert_eq!(rated.interval, 1);
        assert!(approx(rated.ease_factor, 1.8));
    }

    #[test]
    fn ease_never_drops_below_floor() {
        let mut card = fresh_card();
        for _ in 0..20 {
            card = rate(&card, Rating::Hard, fixed_now());
            assert!(card.ease_factor >= 1.3);
        }
        assert!(approx(card.ease_factor, 1.3));

        // A medium rating on a corrupted ease is also floored.
        card.ease_factor = 0.4;
        let rated = rate(&card, Rating::Medium, fixed_now());
        assert!(approx(rated.ease_factor, 1.3));
        assert_eq!(rated.interval, 2);
    }

    #[test]
    fn learned_after_third_easy_review_and_not_before() {
        let mut card = fresh_card();

        card = rate(&card, Rating::Easy, fixed_now());
        assert!(!card.is_learned);
        card = rate(&card, Rating::Easy, fixed_now());
        assert!(!card.is_learned);
        card = rate(&card, Rating::Easy, fixed_now());
        assert!(card.is_learned);
        assert_eq!(card.review_count, 3);
    }

    #[test]
    fn non_easy_rating_clears_learned() {
        let mut card = fresh_card();
        card.review_count = 5;
        card.is_learned = true;

        let rated = rate(&card, Rating::Medium, fixed_now());
        assert!(!rated.is_learned);
    }

    #[test]
    fn zero_interval_is_treated_as_one_day() {
        let mut card = fresh_card();
        card.interval = 0;
        let rated = rate(&card, Rating::Medium, fixed_now());
        assert_eq!(rated.interval, 3);
    }

    #[test]
    fn interval_is_capped() {
        let scheduler = Scheduler {
            max_interval_days: 30,
            ..Scheduler::default()
        };
        let mut card = fresh_card();
        card.interval = 25;
        let rated = scheduler.rate(&card, Rating::Easy, fixed_now());
        assert_eq!(rated.interval, 30);
    }

    #[test]
    fn due_policy() {
        let scheduler = Scheduler::default();
        let now = fixed_now();
        let mut card = fresh_card();
        assert!(scheduler.is_due(&card, now));
        assert_eq!(scheduler.days_since_review(&card, now), None);

        card.last_reviewed = Some(now - Duration::days(2) - Duration::hours(23));
        card.interval = 3;
        assert_eq!(scheduler.days_since_review(&card, now), Some(2));
        assert!(!scheduler.is_due(&card, now));

        card.last_reviewed = Some(now - Duration::days(3));
        assert!(scheduler.is_due(&card, now));
    }

    #[test]
    fn rate_keeps_content_fields() {
        let card = fresh_card().with_example("I would like a cappuccino, please.");
        let rated = rate(&card, Rating::Hard, fixed_now());
        assert_eq!(rated.id, card.id);
        assert_eq!(rated.front, card.front);
        assert_eq!(rated.example, card.example);
    }
}
