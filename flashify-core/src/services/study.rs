//! Study service
//!
//! Builds study queues and deck statistics from the persisted feedback log,
//! and appends a feedback record for every answer. No scheduling state is
//! kept between calls.

use crate::clock::Clock;
use crate::database::{Card, Feedback, FeedbackRecord, Repository};
use crate::error::Result;
use crate::study::{self, CategoryStats, ReviewPolicy, StudyPartition};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Service for study sessions
#[derive(Clone)]
pub struct StudyService {
    repo: Repository,
    policy: Arc<dyn ReviewPolicy>,
    clock: Arc<dyn Clock>,
}

impl StudyService {
    pub fn new(repo: Repository, policy: Arc<dyn ReviewPolicy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            policy,
            clock,
        }
    }

    /// Ordered study queue for a category at the current time
    pub async fn get_study_queue(&self, category_id: &str) -> Result<Vec<Card>> {
        self.get_study_queue_at(category_id, self.clock.now()).await
    }

    /// Ordered study queue for a category at `now`
    pub async fn get_study_queue_at(
        &self,
        category_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Card>> {
        let queue = self.get_study_partition_at(category_id, now).await?.into_queue();

        tracing::debug!("Study queue for category {}: {} cards", category_id, queue.len());
        Ok(queue)
    }

    /// Study queue split into its groups
    pub async fn get_study_partition_at(
        &self,
        category_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StudyPartition> {
        let (cards, records) = self.load_category(category_id).await?;
        Ok(study::partition(&cards, &records, now))
    }

    /// Deck statistics at the current time
    pub async fn get_category_stats(&self, category_id: &str) -> Result<CategoryStats> {
        self.get_category_stats_at(category_id, self.clock.now()).await
    }

    /// Deck statistics at `now`
    pub async fn get_category_stats_at(
        &self,
        category_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CategoryStats> {
        let (cards, records) = self.load_category(category_id).await?;
        Ok(study::compute_stats(&cards, &records, now))
    }

    /// Record an answer given as its string value, answered now.
    ///
    /// Unknown feedback values fail with a validation error before
    /// anything is written.
    pub async fn record_feedback(
        &self,
        category_id: &str,
        card_id: &str,
        feedback: &str,
    ) -> Result<FeedbackRecord> {
        let feedback: Feedback = feedback.parse()?;
        self.record_feedback_at(category_id, card_id, feedback, self.clock.now())
            .await
    }

    /// Record an answer at an explicit time.
    ///
    /// Any card may be answered at any time, due or not. A mistaken answer is
    /// corrected by recording a new one; the latest record wins.
    pub async fn record_feedback_at(
        &self,
        category_id: &str,
        card_id: &str,
        feedback: Feedback,
        answered_at: DateTime<Utc>,
    ) -> Result<FeedbackRecord> {
        let next_review_at = self.policy.next_review(feedback, answered_at)?;

        let record = self
            .repo
            .append_feedback(category_id, card_id, feedback, answered_at, next_review_at)
            .await?;

        tracing::info!(
            "Recorded {} for card {} (next review {})",
            feedback,
            card_id,
            next_review_at
        );

        Ok(record)
    }

    /// Answer history of a card, newest first
    pub async fn card_history(&self, card_id: &str) -> Result<Vec<FeedbackRecord>> {
        self.repo.get_card(card_id).await?;
        self.repo.list_card_feedback(card_id).await
    }

    async fn load_category(&self, category_id: &str) -> Result<(Vec<Card>, Vec<FeedbackRecord>)> {
        let (_, cards, records) = self.repo.load_category_snapshot(category_id).await?;
        Ok((cards, records))
    }
}
