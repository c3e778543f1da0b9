//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Failures inside `ProgressStore` writes.
///
/// The public mutators log these and fall back to the in-memory result.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error("progress kept changing underneath us after {attempts} attempts")]
    Contended { attempts: u32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures inside `FlashcardStore` writes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlashcardStoreError {
    #[error("flashcards kept changing underneath us after {attempts} attempts")]
    Contended { attempts: u32 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by review sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReviewSessionError {
    #[error("no cards available for review")]
    Empty,
    #[error("review session already completed")]
    Completed,
}

/// Errors reported by a pronunciation scorer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PronunciationError {
    #[error("nothing to score: expected text is empty")]
    EmptyText,
    #[error("recording unavailable: {0}")]
    Recording(String),
    #[error("scorer failed: {0}")]
    Scorer(String),
}

/// Errors reported by a speech output backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("audio asset not found: {0}")]
    MissingAudio(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
