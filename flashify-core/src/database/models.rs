//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to frontend.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// A named collection of cards (a deck)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Remote deck this category was downloaded from, if any
    pub source_deck_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category row with its card count, for deck lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryWithCount {
    pub id: String,
    pub name: String,
    pub source_deck_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub card_count: i64,
}

/// A flashcard: front/back text pair owned by one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: String,
    pub category_id: String,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
}

/// Create card request
#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// User's answer to a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Feedback {
    Correct,
    Hard,
    Wrong,
}

impl Feedback {
    pub const ALL: [Feedback; 3] = [Feedback::Correct, Feedback::Hard, Feedback::Wrong];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Correct => "correct",
            Feedback::Hard => "hard",
            Feedback::Wrong => "wrong",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feedback {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "correct" => Ok(Feedback::Correct),
            "hard" => Ok(Feedback::Hard),
            "wrong" => Ok(Feedback::Wrong),
            "" => Err(AppError::Validation("feedback is required".to_string())),
            other => Err(AppError::Validation(format!(
                "unknown feedback '{}', expected one of: correct, hard, wrong",
                other
            ))),
        }
    }
}

/// One study answer. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FeedbackRecord {
    pub id: String,
    pub category_id: String,
    pub card_id: String,
    pub feedback: Feedback,
    pub answered_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
}
