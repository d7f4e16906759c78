//! Deck statistics
//!
//! Derived from the same latest-record-per-card view as the study queue,
//! so `pending_review` always equals the size of the due-for-review group.

use super::queue::{classify, latest_feedback_per_card, StudyGroup};
use crate::database::{Card, Feedback, FeedbackRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts for a deck-overview screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub total_cards: usize,
    /// Cards with no feedback at all
    pub not_studied: usize,
    /// Cards whose latest answer is correct/hard and is due
    pub pending_review: usize,
    pub correct_count: usize,
    pub hard_count: usize,
    pub wrong_count: usize,
    pub last_studied_at: Option<DateTime<Utc>>,
}

impl CategoryStats {
    /// Cards with at least one answer
    pub fn studied(&self) -> usize {
        self.correct_count + self.hard_count + self.wrong_count
    }
}

pub fn compute_stats(cards: &[Card], records: &[FeedbackRecord], now: DateTime<Utc>) -> CategoryStats {
    let latest = latest_feedback_per_card(records);
    let mut stats = CategoryStats {
        total_cards: cards.len(),
        ..CategoryStats::default()
    };

    for card in cards {
        let record = latest.get(card.id.as_str()).copied();

        match classify(record, now) {
            Some(StudyGroup::NeverStudied) => stats.not_studied += 1,
            Some(StudyGroup::DueForReview) => stats.pending_review += 1,
            Some(StudyGroup::PreviouslyWrong) | None => {}
        }

        if let Some(record) = record {
            match record.feedback {
                Feedback::Correct => stats.correct_count += 1,
                Feedback::Hard => stats.hard_count += 1,
                Feedback::Wrong => stats.wrong_count += 1,
            }

            stats.last_studied_at = stats.last_studied_at.max(Some(record.answered_at));
        }
    }

    stats
}
