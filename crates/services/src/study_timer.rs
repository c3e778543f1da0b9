use chrono::{DateTime, Utc};
use tracing::debug;

use lingua_core::model::UserProgress;

use crate::progress_store::ProgressStore;

/// Measures one study sitting and credits whole minutes to progress.
#[derive(Debug, Clone, Copy)]
pub struct StudyTimer {
    started_at: DateTime<Utc>,
}

impl StudyTimer {
    /// Start timing now, according to the store's clock.
    #[must_use]
    pub fn start(progress: &ProgressStore) -> Self {
        Self::started_at(progress.clock().now())
    }

    #[must_use]
    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    /// Whole minutes elapsed at `now`; never negative.
    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        let minutes = now.signed_duration_since(self.started_at).num_minutes();
        u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
    }

    /// Credit the elapsed minutes. Less than a minute credits nothing and writes nothing.
    pub async fn finish(self, progress: &ProgressStore) -> Option<UserProgress> {
        let minutes = self.elapsed_minutes(progress.clock().now());
        if minutes == 0 {
            debug!("study sitting shorter than a minute");
            return None;
        }
        Some(progress.add_study_time(minutes).await)
    }
}
