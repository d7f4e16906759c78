//! Error types for Flashify
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use thiserror::Error;

/// SQLite primary result codes that indicate contention rather than a bad query
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// Storage temporarily unavailable; the operation may be retried
    #[error("Storage temporarily unavailable: {0}")]
    Transient(String),
}

impl AppError {
    /// Whether the caller may retry the failed operation with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }

    /// Whether this error is one of the not-found variants
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::CategoryNotFound(_) | AppError::CardNotFound(_)
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                AppError::Transient(err.to_string())
            }
            sqlx::Error::Io(_) => AppError::Transient(err.to_string()),
            sqlx::Error::Database(db_err) if is_contention_code(db_err.code().as_deref()) => {
                AppError::Transient(err.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

/// SQLite reports extended result codes; the low byte is the primary code.
fn is_contention_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
