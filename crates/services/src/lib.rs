#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod flashcard_store;
pub mod progress_store;
pub mod pronunciation;
pub mod review_service;
pub mod review_session;
pub mod speech;
pub mod study_timer;

pub use lingua_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, FlashcardStoreError, ProgressStoreError, PronunciationError,
    ReviewSessionError, SpeechError,
};
pub use flashcard_store::FlashcardStore;
pub use progress_store::ProgressStore;
pub use pronunciation::{MockScorer, PracticeOutcome, PronunciationScorer, PronunciationService};
pub use review_service::{RatedCard, ReviewService};
pub use review_session::ReviewSession;
pub use speech::{Narrator, SilentSpeech, SpeechOutput};
pub use study_timer::StudyTimer;
