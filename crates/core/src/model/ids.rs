use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an identifier is blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must not be empty")]
pub struct IdError {
    kind: &'static str,
}

impl IdError {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a non-blank string (surrounding whitespace is trimmed).
            ///
            /// # Errors
            ///
            /// Returns `IdError` if the value is empty after trimming.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(IdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a conversation scenario (e.g. `cafe-1`).
    ScenarioId
);
string_id!(
    /// Identifier of a flashcard.
    FlashcardId
);
string_id!(
    /// Identifier of a vocabulary word tracked in the mastery map.
    WordId
);
string_id!(
    /// Key of a practised phrase in the pronunciation score map.
    PhraseKey
);
string_id!(
    /// Identifier of an achievement catalog entry.
    AchievementId
);

impl From<&FlashcardId> for WordId {
    fn from(id: &FlashcardId) -> Self {
        // Both are non-blank by construction.
        Self(id.0.clone())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
