use std::sync::Arc;

use async_trait::async_trait;
use rand::{Rng, rng};
use tracing::{debug, warn};

use lingua_core::model::{Percent, PhraseKey, UserProgress};
use lingua_core::pronunciation::{DetailedScores, PhonemeScore, PronunciationResult, feedback_for};

use crate::error::PronunciationError;
use crate::progress_store::ProgressStore;

/// Words of the expected text that get a phoneme breakdown.
const PHONEME_WORDS: usize = 3;

/// Scores a recording against the text the learner was asked to say.
#[async_trait]
pub trait PronunciationScorer: Send + Sync {
    /// # Errors
    ///
    /// Returns `PronunciationError` if the recording cannot be analysed.
    async fn analyze(
        &self,
        recording: &str,
        expected_text: &str,
    ) -> Result<PronunciationResult, PronunciationError>;
}

/// Stand-in scorer producing plausible random scores.
///
/// The overall score is uniform in [60, 100). Detailed scores land within 5 points of it and
/// the first three words get phoneme scores within 10 points.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockScorer;

impl MockScorer {
    fn result_for(base: f64, expected_text: &str, rng: &mut impl Rng) -> PronunciationResult {
        let mut jitter = |spread: f64| Percent::saturating_from_f64(base + rng.random_range(-spread..spread));

        let detailed_scores = DetailedScores {
            accuracy: jitter(5.0),
            fluency: jitter(5.0),
            completeness: jitter(5.0),
        };
        let phonemes = expected_text
            .split_whitespace()
            .take(PHONEME_WORDS)
            .enumerate()
            .map(|(index, word)| PhonemeScore {
                phoneme: word.to_lowercase(),
                accuracy: jitter(10.0),
                feedback: if index == 0 {
                    "Good stress pattern".to_owned()
                } else {
                    "Clear pronunciation".to_owned()
                },
            })
            .collect();

        PronunciationResult {
            score: Percent::saturating_from_f64(base),
            feedback: feedback_for(base).to_owned(),
            detailed_scores,
            phonemes,
        }
    }
}

#[async_trait]
impl PronunciationScorer for MockScorer {
    async fn analyze(
        &self,
        recording: &str,
        expected_text: &str,
    ) -> Result<PronunciationResult, PronunciationError> {
        if expected_text.trim().is_empty() {
            return Err(PronunciationError::EmptyText);
        }
        let mut rng = rng();
        let base = rng.random_range(60.0..100.0);
        debug!(recording, base, "mock pronunciation score");
        Ok(Self::result_for(base, expected_text, &mut rng))
    }
}

/// Outcome of one practice attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeOutcome {
    pub result: PronunciationResult,
    /// Progress after recording the score; `None` when nothing was recorded.
    pub progress: Option<UserProgress>,
}

/// Runs a scorer and records successful scores under the practised phrase.
#[derive(Clone)]
pub struct PronunciationService {
    scorer: Arc<dyn PronunciationScorer>,
    progress: Arc<ProgressStore>,
}

impl PronunciationService {
    #[must_use]
    pub fn new(scorer: Arc<dyn PronunciationScorer>, progress: Arc<ProgressStore>) -> Self {
        Self { scorer, progress }
    }

    /// Score `recording` against `expected_text`.
    ///
    /// A scorer failure is logged and yields `PronunciationResult::unavailable()` with progress
    /// left untouched.
    pub async fn practice(&self, recording: &str, expected_text: &str) -> PracticeOutcome {
        let result = match self.scorer.analyze(recording, expected_text).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "pronunciation analysis failed");
                return PracticeOutcome {
                    result: PronunciationResult::unavailable(),
                    progress: None,
                };
            }
        };

        let progress = match PhraseKey::new(expected_text) {
            Ok(phrase) => Some(
                self.progress
                    .update_pronunciation_score(&phrase, result.score)
                    .await,
            ),
            Err(err) => {
                warn!(error = %err, "cannot key pronunciation score");
                None
            }
        };

        PracticeOutcome { result, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::time::{DayPolicy, fixed_clock};
    use storage::repository::InMemoryRepository;

    struct FixedScorer(Percent);

    #[async_trait]
    impl PronunciationScorer for FixedScorer {
        async fn analyze(
            &self,
            _recording: &str,
            _expected_text: &str,
        ) -> Result<PronunciationResult, PronunciationError> {
            Ok(PronunciationResult {
                score: self.0,
                feedback: feedback_for(f64::from(self.0.value())).to_owned(),
                detailed_scores: DetailedScores::default(),
                phonemes: Vec::new(),
            })
        }
    }

    struct BrokenScorer;

    #[async_trait]
    impl PronunciationScorer for BrokenScorer {
        async fn analyze(
            &self,
            recording: &str,
            _expected_text: &str,
        ) -> Result<PronunciationResult, PronunciationError> {
            Err(PronunciationError::Recording(recording.to_owned()))
        }
    }

    fn progress_store() -> Arc<ProgressStore> {
        Arc::new(ProgressStore::new(
            fixed_clock(),
            DayPolicy::utc(),
            Arc::new(InMemoryRepository::new()),
        ))
    }

    #[tokio::test]
    async fn mock_scores_stay_in_range() {
        for _ in 0..50 {
            let result = MockScorer
                .analyze("rec.m4a", "I would like a cappuccino, please.")
                .await
                .unwrap();
            assert!((60..=100).contains(&result.score.value()));
            assert_eq!(result.phonemes.len(), 3);
            assert_eq!(result.phonemes[0].phoneme, "i");
            assert_eq!(result.phonemes[0].feedback, "Good stress pattern");
            let spread = i16::from(result.detailed_scores.accuracy.value())
                - i16::from(result.score.value());
            assert!(spread.abs() <= 6);
        }
    }

    #[tokio::test]
    async fn mock_rejects_empty_text() {
        assert!(matches!(
            MockScorer.analyze("rec.m4a", "  ").await,
            Err(PronunciationError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn practice_records_score_under_phrase() {
        let progress = progress_store();
        let service = PronunciationService::new(
            Arc::new(FixedScorer(Percent::new(92).unwrap())),
            Arc::clone(&progress),
        );

        let outcome = service.practice("rec.m4a", "Hello").await;
        assert_eq!(outcome.result.score.value(), 92);

        let stored = progress.load().await;
        assert_eq!(
            stored.pronunciation_scores.get(&PhraseKey::new("Hello").unwrap()),
            Some(&Percent::new(92).unwrap())
        );
        assert!(
            stored
                .achievements
                .iter()
                .any(|a| a.id.as_str() == "pronunciation_90" && a.unlocked)
        );
    }

    #[tokio::test]
    async fn failed_analysis_leaves_progress_alone() {
        let progress = progress_store();
        let service = PronunciationService::new(Arc::new(BrokenScorer), Arc::clone(&progress));

        let outcome = service.practice("missing.m4a", "Hello").await;
        assert!(outcome.result.is_unavailable());
        assert!(outcome.progress.is_none());
        assert!(progress.load().await.pronunciation_scores.is_empty());
    }
}
