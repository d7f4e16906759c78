//! Database module
//!
//! This module provides all database functionality including:
//! - Schema and migrations
//! - Model definitions
//! - Repository layer for categories, cards and the feedback log

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::error::Result;
use crate::services::settings::StorageSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Build connection options shared by migration and application connections.
fn connect_options(
    db_path: &Path,
    busy_timeout: Duration,
) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display())).map(
        |opts| {
            opts.create_if_missing(true)
                .busy_timeout(busy_timeout)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
        },
    )
}

/// Create and initialize a database connection pool with default storage settings.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    create_pool_with(db_path, &StorageSettings::default()).await
}

/// Create and initialize a database connection pool.
///
/// Out-of-range settings are rejected before anything is opened.
/// Migrations run on a dedicated single-connection pool that is closed
/// before the application pool is created, so every application
/// connection sees the final schema.
pub async fn create_pool_with(db_path: &Path, settings: &StorageSettings) -> Result<SqlitePool> {
    settings.validate()?;
    tracing::info!("Creating database connection pool at: {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let busy_timeout = Duration::from_secs(settings.busy_timeout_secs);

    let migration_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(db_path, busy_timeout)?)
        .await?;

    initialize_database(&migration_pool).await?;
    migration_pool.close().await;

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(connect_options(db_path, busy_timeout)?)
        .await?;

    tracing::info!(
        "Database pool created successfully ({} max connections)",
        settings.max_connections
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_invalid_storage_settings_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("flashify.db");

        let settings = StorageSettings {
            max_connections: 0,
            ..StorageSettings::default()
        };
        let err = create_pool_with(&db_path, &settings).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let settings = StorageSettings {
            busy_timeout_secs: u64::MAX,
            ..StorageSettings::default()
        };
        let err = create_pool_with(&db_path, &settings).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Nothing was created on disk
        assert!(!db_path.exists());
    }

    #[tokio::test]
    async fn test_create_pool_with_custom_settings() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("flashify.db");

        let settings = StorageSettings {
            max_connections: 2,
            busy_timeout_secs: 1,
        };
        let pool = create_pool_with(&db_path, &settings).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'study_feedback'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 1);

        pool.close().await;
    }
}
