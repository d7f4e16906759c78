//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the application.

// ===== Storage =====

/// File name of the SQLite database inside the app data directory
pub const DATABASE_FILE_NAME: &str = "flashify.db";

/// File name of the JSON settings file inside the app data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Default number of pooled SQLite connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Upper bound for pooled connections. SQLite serializes writers anyway,
/// so more connections only adds file handles.
pub const MAX_MAX_CONNECTIONS: u32 = 16;

/// Default time a connection waits on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Maximum busy timeout (1 minute)
pub const MAX_BUSY_TIMEOUT_SECS: u64 = 60;

// ===== Review Intervals =====

/// Days until a card answered `correct` is due again
pub const CORRECT_INTERVAL_DAYS: u32 = 3;

/// Days until a card answered `hard` is due again
pub const HARD_INTERVAL_DAYS: u32 = 1;

/// Maximum configurable review interval (1 year)
pub const MAX_INTERVAL_DAYS: u32 = 365;

// ===== Card Content Limits =====

/// Maximum length of a deck name in characters
pub const MAX_DECK_NAME_LENGTH: usize = 200;

/// Maximum length of one side of a card in characters
pub const MAX_CARD_SIDE_LENGTH: usize = 10_000;
