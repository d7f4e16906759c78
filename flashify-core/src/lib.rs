//! Flashify study engine
//!
//! Decides which cards of a deck are due and in what order, and records
//! how each answer moves a card's next review. Host applications call
//! `StudyService::get_study_queue`, `get_category_stats` and
//! `record_feedback` through an `AppState`.

pub mod app;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod services;
pub mod study;

pub use app::AppState;
pub use error::{AppError, Result};
