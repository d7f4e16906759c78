//! Services module
//!
//! Business logic services that coordinate between callers and repository.

pub mod decks;
pub mod settings;
pub mod study;

pub use decks::DeckService;
pub use settings::{AppSettings, SettingsService, StorageSettings, StudySettings};
pub use study::StudyService;
