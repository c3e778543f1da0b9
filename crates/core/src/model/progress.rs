use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog;
use crate::model::achievement::Achievement;
use crate::model::ids::{PhraseKey, ScenarioId, WordId};
use crate::model::percent::Percent;
use crate::time::DayPolicy;

/// Points awarded the first time a scenario is completed.
pub const SCENARIO_POINTS: u32 = 100;

/// Score needed per level.
pub const POINTS_PER_LEVEL: u32 = 500;

/// Mastery at or above which a word counts as learned.
pub const LEARNED_MASTERY: u8 = 80;

/// Level reached at `score`: one level per 500 points, starting at 1.
#[must_use]
pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL + 1
}

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Everything tracked about a learner: score, streak, study time, mastery and achievements.
///
/// `level` is derived from `score` and kept consistent by every mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub completed_scenarios: Vec<ScenarioId>,
    pub score: u32,
    pub level: u32,
    pub achievements: Vec<Achievement>,
    pub vocabulary_mastery: BTreeMap<WordId, Percent>,
    pub daily_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<DateTime<Utc>>,
    pub total_study_time: u32,
    pub pronunciation_scores: BTreeMap<PhraseKey, Percent>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            completed_scenarios: Vec::new(),
            score: 0,
            level: 1,
            achievements: catalog::default_achievements(),
            vocabulary_mastery: BTreeMap::new(),
            daily_streak: 0,
            last_active_date: None,
            total_study_time: 0,
            pronunciation_scores: BTreeMap::new(),
        }
    }
}

impl UserProgress {
    /// Repairs derived state after loading a persisted record.
    ///
    /// Recomputes `level` and aligns the achievement list with the catalog: known entries keep
    /// their unlock state, new catalog entries are added locked, retired ones are dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.level = level_for_score(self.score);

        let mut persisted = std::mem::take(&mut self.achievements);
        self.achievements = catalog::default_achievements()
            .into_iter()
            .map(|fresh| {
                match persisted.iter().position(|a| a.id == fresh.id) {
                    Some(idx) => {
                        let old = persisted.swap_remove(idx);
                        Achievement {
                            unlocked: old.unlocked,
                            unlocked_date: old.unlocked_date,
                            ..fresh
                        }
                    }
                    None => fresh,
                }
            })
            .collect();
        self
    }

    /// Records a completed scenario.
    ///
    /// Returns false (and changes nothing) if the scenario was already completed. Otherwise
    /// awards points, recomputes the level and advances the daily streak by calendar day.
    pub fn complete_scenario(
        &mut self,
        scenario: &ScenarioId,
        now: DateTime<Utc>,
        days: &DayPolicy,
    ) -> bool {
        if self.completed_scenarios.contains(scenario) {
            return false;
        }

        self.completed_scenarios.push(scenario.clone());
        self.score = self.score.saturating_add(SCENARIO_POINTS);
        self.level = level_for_score(self.score);
        self.touch_streak(now, days);
        true
    }

    fn touch_streak(&mut self, now: DateTime<Utc>, days: &DayPolicy) {
        match self.last_active_date {
            Some(last) if days.day_of(last) == days.day_of(now) => return,
            Some(last) if days.is_next_day(last, now) => {
                self.daily_streak = self.daily_streak.saturating_add(1);
            }
            _ => self.daily_streak = 1,
        }
        self.last_active_date = Some(now);
    }

    pub fn add_study_time(&mut self, minutes: u32) {
        self.total_study_time = self.total_study_time.saturating_add(minutes);
    }

    /// Overwrites the score for a phrase; no history is kept.
    pub fn record_pronunciation(&mut self, phrase: PhraseKey, score: Percent) {
        self.pronunciation_scores.insert(phrase, score);
    }

    pub fn record_vocabulary(&mut self, word: WordId, mastery: Percent) {
        self.vocabulary_mastery.insert(word, mastery);
    }

    #[must_use]
    pub fn has_completed(&self, scenario: &ScenarioId) -> bool {
        self.completed_scenarios.contains(scenario)
    }

    /// Words whose mastery is at least [`LEARNED_MASTERY`].
    #[must_use]
    pub fn learned_word_count(&self) -> u32 {
        let count = self
            .vocabulary_mastery
            .values()
            .filter(|m| m.value() >= LEARNED_MASTERY)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Mean pronunciation score, or 0 when nothing has been recorded.
    #[must_use]
    pub fn average_pronunciation(&self) -> f64 {
        if self.pronunciation_scores.is_empty() {
            return 0.0;
        }
        let total: u32 = self
            .pronunciation_scores
            .values()
            .map(|s| u32::from(s.value()))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.pronunciation_scores.len() as f64;
        f64::from(total) / count
    }

    /// Points still needed to reach the next level.
    #[must_use]
    pub fn points_to_next_level(&self) -> u32 {
        POINTS_PER_LEVEL - self.score % POINTS_PER_LEVEL
    }

    #[must_use]
    pub fn metrics(&self) -> ProgressMetrics {
        ProgressMetrics {
            scenarios_completed: u32::try_from(self.completed_scenarios.len())
                .unwrap_or(u32::MAX),
            daily_streak: self.daily_streak,
            learned_words: self.learned_word_count(),
            average_pronunciation: self.average_pronunciation(),
            total_study_minutes: self.total_study_time,
        }
    }
}

/// Snapshot of the values achievement requirements are checked against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressMetrics {
    pub scenarios_completed: u32,
    pub daily_streak: u32,
    pub learned_words: u32,
    pub average_pronunciation: f64,
    pub total_study_minutes: u32,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
