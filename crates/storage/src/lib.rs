#![forbid(unsafe_code)]

mod mapping;
pub mod repository;
pub mod sqlite;

pub use repository::{
    FlashcardRepository, InMemoryRepository, KeyValueStore, ProgressRepository, Storage,
    StorageError, StoredValue, Versioned,
};
