//! Due-set partitioning
//!
//! A deck's study queue is three disjoint groups in fixed priority order:
//! 1. never studied (creation order)
//! 2. due for review: latest answer `correct`/`hard` and `next_review_at <= now`
//!    (soonest due first)
//! 3. previously wrong: latest answer `wrong`, regardless of `now`
//!    (most recently missed first)
//!
//! Only the latest record per card decides its group. Cards answered
//! `correct`/`hard` that are not yet due are left out.

use crate::database::{Card, Feedback, FeedbackRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Bucket a card falls into for the study queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyGroup {
    NeverStudied,
    DueForReview,
    PreviouslyWrong,
}

/// A deck split into its study groups, each already ordered
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudyPartition {
    pub never_studied: Vec<Card>,
    pub due_for_review: Vec<Card>,
    pub previously_wrong: Vec<Card>,
}

impl StudyPartition {
    pub fn len(&self) -> usize {
        self.never_studied.len() + self.due_for_review.len() + self.previously_wrong.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Group a card was placed in, if it is queued at all
    pub fn group_of(&self, card_id: &str) -> Option<StudyGroup> {
        let contains = |cards: &[Card]| cards.iter().any(|c| c.id == card_id);

        if contains(&self.never_studied) {
            Some(StudyGroup::NeverStudied)
        } else if contains(&self.due_for_review) {
            Some(StudyGroup::DueForReview)
        } else if contains(&self.previously_wrong) {
            Some(StudyGroup::PreviouslyWrong)
        } else {
            None
        }
    }

    /// Concatenate the groups into the study queue
    pub fn into_queue(self) -> Vec<Card> {
        let mut queue = self.never_studied;
        queue.extend(self.due_for_review);
        queue.extend(self.previously_wrong);
        queue
    }
}

/// Latest feedback record per card id.
///
/// The greatest `answered_at` wins; on an exact tie the record that comes
/// later in `records` wins.
pub fn latest_feedback_per_card(records: &[FeedbackRecord]) -> HashMap<&str, &FeedbackRecord> {
    let mut latest: HashMap<&str, &FeedbackRecord> = HashMap::new();

    for record in records {
        latest
            .entry(record.card_id.as_str())
            .and_modify(|current| {
                if record.answered_at >= current.answered_at {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    latest
}

/// Group for a card given its latest record; `None` means not queued now
pub fn classify(latest: Option<&FeedbackRecord>, now: DateTime<Utc>) -> Option<StudyGroup> {
    match latest {
        None => Some(StudyGroup::NeverStudied),
        Some(record) => match record.feedback {
            Feedback::Wrong => Some(StudyGroup::PreviouslyWrong),
            Feedback::Correct | Feedback::Hard if record.next_review_at <= now => {
                Some(StudyGroup::DueForReview)
            }
            Feedback::Correct | Feedback::Hard => None,
        },
    }
}

/// Split `cards` into ordered study groups.
///
/// Records for cards not in `cards` are ignored.
pub fn partition(cards: &[Card], records: &[FeedbackRecord], now: DateTime<Utc>) -> StudyPartition {
    let latest = latest_feedback_per_card(records);

    let mut never_studied: Vec<(usize, &Card)> = Vec::new();
    let mut due: Vec<(usize, &Card, &FeedbackRecord)> = Vec::new();
    let mut wrong: Vec<(usize, &Card, &FeedbackRecord)> = Vec::new();

    for (position, card) in cards.iter().enumerate() {
        let record = latest.get(card.id.as_str()).copied();

        match (classify(record, now), record) {
            (Some(StudyGroup::NeverStudied), _) => never_studied.push((position, card)),
            (Some(StudyGroup::DueForReview), Some(record)) => due.push((position, card, record)),
            (Some(StudyGroup::PreviouslyWrong), Some(record)) => wrong.push((position, card, record)),
            _ => {}
        }
    }

    never_studied.sort_by_key(|(position, card)| (card.created_at, *position));
    due.sort_by_key(|(position, _, record)| (record.next_review_at, *position));
    wrong.sort_by(|(pa, _, a), (pb, _, b)| b.answered_at.cmp(&a.answered_at).then(pa.cmp(pb)));

    tracing::debug!(
        "Partitioned {} cards: {} new, {} due, {} wrong",
        cards.len(),
        never_studied.len(),
        due.len(),
        wrong.len()
    );

    StudyPartition {
        never_studied: never_studied.into_iter().map(|(_, c)| c.clone()).collect(),
        due_for_review: due.into_iter().map(|(_, c, _)| c.clone()).collect(),
        previously_wrong: wrong.into_iter().map(|(_, c, _)| c.clone()).collect(),
    }
}

/// Ordered study queue for a deck at `now`
pub fn build_study_queue(cards: &[Card], records: &[FeedbackRecord], now: DateTime<Utc>) -> Vec<Card> {
    partition(cards, records, now).into_queue()
}
