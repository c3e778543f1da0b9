use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::AchievementId;
use crate::model::progress::ProgressMetrics;

//
// ─── REQUIREMENT ───────────────────────────────────────────────────────────────
//

/// Threshold an achievement waits for, one variant per tracked metric.
///
/// Persisted as `{ "type": "<kind>", "target": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Requirement {
    /// Number of distinct completed scenarios.
    Scenarios { target: u32 },
    /// Consecutive calendar days with a completed scenario.
    Streak { target: u32 },
    /// Number of words with mastery of at least 80.
    Vocabulary { target: u32 },
    /// Mean of all recorded pronunciation scores.
    Pronunciation { target: u32 },
    /// Total study time in minutes.
    Time { target: u32 },
}

impl Requirement {
    #[must_use]
    pub fn target(&self) -> u32 {
        match *self {
            Requirement::Scenarios { target }
            | Requirement::Streak { target }
            | Requirement::Vocabulary { target }
            | Requirement::Pronunciation { target }
            | Requirement::Time { target } => target,
        }
    }

    /// Current value of the metric this requirement watches.
    #[must_use]
    pub fn metric(&self, metrics: &ProgressMetrics) -> f64 {
        match self {
            Requirement::Scenarios { .. } => f64::from(metrics.scenarios_completed),
            Requirement::Streak { .. } => f64::from(metrics.daily_streak),
            Requirement::Vocabulary { .. } => f64::from(metrics.learned_words),
            Requirement::Pronunciation { .. } => metrics.average_pronunciation,
            Requirement::Time { .. } => f64::from(metrics.total_study_minutes),
        }
    }

    #[must_use]
    pub fn is_met(&self, metrics: &ProgressMetrics) -> bool {
        self.metric(metrics) >= f64::from(self.target())
    }
}

//
// ─── CATALOG ENTRY ─────────────────────────────────────────────────────────────
//

/// Immutable catalog description of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: Requirement,
}

//
// ─── ACHIEVEMENT ───────────────────────────────────────────────────────────────
//

/// Catalog entry plus its unlock state inside a learner's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub requirement: Requirement,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_date: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Builds the locked runtime state for a catalog entry.
    ///
    /// Returns `None` if the catalog id is blank.
    #[must_use]
    pub fn locked(def: &AchievementDef) -> Option<Self> {
        Some(Self {
            id: AchievementId::new(def.id).ok()?,
            title: def.title.to_owned(),
            description: def.description.to_owned(),
            icon: def.icon.to_owned(),
            requirement: def.requirement,
            unlocked: false,
            unlocked_date: None,
        })
    }

    /// Marks the achievement unlocked. Already-unlocked state is left untouched.
    ///
    /// Returns true if this call unlocked it.
    pub fn unlock(&mut self, at: DateTime<Utc>) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.unlocked_date = Some(at);
        true
    }
}
