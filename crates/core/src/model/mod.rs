mod achievement;
mod flashcard;
mod ids;
mod percent;
mod progress;
mod review;

pub use ids::{AchievementId, FlashcardId, IdError, PhraseKey, ScenarioId, WordId};
pub use percent::{Percent, PercentError};

pub use achievement::{Achievement, AchievementDef, Requirement};
pub use flashcard::{DifficultyTier, Flashcard, INITIAL_EASE_FACTOR, INITIAL_INTERVAL_DAYS};
pub use progress::{
    LEARNED_MASTERY, POINTS_PER_LEVEL, ProgressMetrics, SCENARIO_POINTS, UserProgress,
    level_for_score,
};
pub use review::{Rating, RatingParseError, ReviewFilter, ReviewMode};
