//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! The database pool is opened once here, handed to every service, and
//! closed on shutdown.

use crate::clock::{Clock, SystemClock};
use crate::config::DATABASE_FILE_NAME;
use crate::database::{create_pool_with, Repository};
use crate::error::Result;
use crate::services::{AppSettings, DeckService, SettingsService, StudyService};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: SettingsService,
    pub decks: DeckService,
    pub study: StudyService,
    pool: SqlitePool,
}

impl AppState {
    /// Open storage under `app_data_dir` and build all services
    pub async fn initialize(app_data_dir: PathBuf) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("App data directory: {:?}", app_data_dir);

        tokio::fs::create_dir_all(&app_data_dir).await?;

        let settings = SettingsService::new(app_data_dir.clone());
        let app_settings = settings.load().await?;

        let pool =
            create_pool_with(&app_data_dir.join(DATABASE_FILE_NAME), &app_settings.storage).await?;

        let state = Self::with_pool(app_data_dir, pool, &app_settings, Arc::new(SystemClock))?;

        tracing::info!("Application initialized successfully");

        Ok(state)
    }

    /// Build services over an already opened pool
    pub fn with_pool(
        app_data_dir: PathBuf,
        pool: SqlitePool,
        app_settings: &AppSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let policy = app_settings.study.policy()?;
        let repo = Repository::new(pool.clone());

        Ok(Self {
            settings: SettingsService::new(app_data_dir.clone()),
            decks: DeckService::new(repo.clone()),
            study: StudyService::new(repo, Arc::new(policy), clock),
            app_data_dir,
            pool,
        })
    }

    /// Close the database pool. Outstanding clones of the services fail
    /// with a transient error afterwards.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down, closing database pool");
        self.pool.close().await;
    }
}
