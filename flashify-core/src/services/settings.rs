//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::{
    CORRECT_INTERVAL_DAYS, DEFAULT_BUSY_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS, HARD_INTERVAL_DAYS,
    MAX_BUSY_TIMEOUT_SECS, MAX_MAX_CONNECTIONS, SETTINGS_FILE_NAME,
};
use crate::error::{AppError, Result};
use crate::study::FixedIntervalPolicy;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Review interval configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySettings {
    #[serde(default = "default_correct_interval_days")]
    pub correct_interval_days: u32,
    #[serde(default = "default_hard_interval_days")]
    pub hard_interval_days: u32,
}

fn default_correct_interval_days() -> u32 {
    CORRECT_INTERVAL_DAYS
}

fn default_hard_interval_days() -> u32 {
    HARD_INTERVAL_DAYS
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            correct_interval_days: default_correct_interval_days(),
            hard_interval_days: default_hard_interval_days(),
        }
    }
}

impl StudySettings {
    /// Build the review policy these settings describe
    pub fn policy(&self) -> Result<FixedIntervalPolicy> {
        FixedIntervalPolicy::new(
            Duration::days(self.correct_interval_days as i64),
            Duration::days(self.hard_interval_days as i64),
        )
    }
}

/// SQLite pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds a connection waits on a locked database
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_busy_timeout_secs() -> u64 {
    DEFAULT_BUSY_TIMEOUT_SECS
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl StorageSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 || self.max_connections > MAX_MAX_CONNECTIONS {
            return Err(AppError::Validation(format!(
                "max_connections must be between 1 and {}",
                MAX_MAX_CONNECTIONS
            )));
        }

        if self.busy_timeout_secs > MAX_BUSY_TIMEOUT_SECS {
            return Err(AppError::Validation(format!(
                "busy_timeout_secs must be at most {}",
                MAX_BUSY_TIMEOUT_SECS
            )));
        }

        Ok(())
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub study: StudySettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

impl AppSettings {
    pub fn validate(&self) -> Result<()> {
        self.study.policy()?;
        self.storage.validate()
    }
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Validate and save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        settings.validate()?;

        let content = serde_json::to_string_pretty(settings)?;

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    /// Get review interval settings
    pub async fn get_study(&self) -> Result<StudySettings> {
        let settings = self.load().await?;
        Ok(settings.study)
    }

    /// Update review interval settings
    pub async fn update_study(&self, study: StudySettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.study = study;
        self.save(&settings).await
    }

    /// Get storage settings
    pub async fn get_storage(&self) -> Result<StorageSettings> {
        let settings = self.load().await?;
        Ok(settings.storage)
    }

    /// Update storage settings; takes effect on the next start
    pub async fn update_storage(&self, storage: StorageSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.storage = storage;
        self.save(&settings).await
    }
}
