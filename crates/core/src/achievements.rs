//! Achievement evaluation.
//!
//! Evaluation is a single pass over the achievement list in catalog order. Locked achievements
//! whose requirement is met are unlocked with the evaluation time; unlocked ones are never
//! touched again, so running it twice gives the same result as running it once.

use chrono::{DateTime, Utc};

use crate::model::{Achievement, AchievementId, UserProgress};

/// Unlock every achievement whose requirement `progress` now satisfies.
///
/// Returns the ids unlocked by this call, in catalog order.
pub fn evaluate(progress: &mut UserProgress, now: DateTime<Utc>) -> Vec<AchievementId> {
    let metrics = progress.metrics();

    progress
        .achievements
        .iter_mut()
        .filter(|achievement| !achievement.unlocked && achievement.requirement.is_met(&metrics))
        .filter_map(|achievement| achievement.unlock(now).then(|| achievement.id.clone()))
        .collect()
}

/// Owned variant of [`evaluate`].
#[must_use]
pub fn evaluated(mut progress: UserProgress, now: DateTime<Utc>) -> UserProgress {
    evaluate(&mut progress, now);
    progress
}

#[must_use]
pub fn unlocked_count(progress: &UserProgress) -> usize {
    progress.achievements.iter().filter(|a| a.unlocked).count()
}

/// First locked achievement in catalog order, the one to show as "up next".
#[must_use]
pub fn next_locked(progress: &UserProgress) -> Option<&Achievement> {
    progress.achievements.iter().find(|a| !a.unlocked)
}
