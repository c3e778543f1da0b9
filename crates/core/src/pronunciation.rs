use serde::{Deserialize, Serialize};

use crate::model::Percent;

/// Per-dimension breakdown of a pronunciation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailedScores {
    pub accuracy: Percent,
    pub fluency: Percent,
    pub completeness: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeScore {
    pub phoneme: String,
    pub accuracy: Percent,
    pub feedback: String,
}

/// What a pronunciation scorer reports for one recording.
///
/// Progress bookkeeping only consumes `score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationResult {
    pub score: Percent,
    pub feedback: String,
    pub detailed_scores: DetailedScores,
    pub phonemes: Vec<PhonemeScore>,
}

impl PronunciationResult {
    /// Zero-score result shown when the recording could not be analysed.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            score: Percent::ZERO,
            feedback: "Unable to analyze pronunciation. Please try again.".to_owned(),
            detailed_scores: DetailedScores::default(),
            phonemes: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.score == Percent::ZERO && self.phonemes.is_empty()
    }
}

/// Banded coaching message for an overall score.
#[must_use]
pub fn feedback_for(score: f64) -> &'static str {
    if score >= 90.0 {
        "Excellent pronunciation! You sound very clear and natural."
    } else if score >= 80.0 {
        "Good pronunciation! A few minor improvements could help."
    } else if score >= 70.0 {
        "Fair pronunciation. Focus on clarity and rhythm."
    } else if score >= 60.0 {
        "Keep practicing! Pay attention to vowel sounds and stress patterns."
    } else {
        "Try speaking slower and focus on each word clearly."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_bands() {
        assert!(feedback_for(95.0).starts_with("Excellent"));
        assert!(feedback_for(90.0).starts_with("Excellent"));
        assert!(feedback_for(89.9).starts_with("Good"));
        assert!(feedback_for(72.0).starts_with("Fair"));
        assert!(feedback_for(60.0).starts_with("Keep practicing"));
        assert!(feedback_for(12.0).starts_with("Try speaking slower"));
    }

    #[test]
    fn unavailable_result_scores_zero() {
        let result = PronunciationResult::unavailable();
        assert_eq!(result.score, Percent::ZERO);
        assert!(result.is_unavailable());
    }
}
