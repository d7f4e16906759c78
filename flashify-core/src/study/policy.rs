//! Review-interval policy
//!
//! Maps an answer to the moment the card becomes due again. The default
//! policy uses fixed intervals with no per-card state:
//! - correct: 3 days
//! - hard: 1 day
//! - wrong: due immediately

use crate::config::{CORRECT_INTERVAL_DAYS, HARD_INTERVAL_DAYS, MAX_INTERVAL_DAYS};
use crate::database::Feedback;
use crate::error::{AppError, Result};
use chrono::{DateTime, Duration, Utc};

/// Computes the next review time for an answer.
///
/// Any implementation must keep `Wrong` immediately due and give `Correct`
/// a strictly longer interval than `Hard`. A due time that cannot be
/// represented is a `Validation` error, never a panic.
pub trait ReviewPolicy: Send + Sync {
    fn next_review(
        &self,
        feedback: Feedback,
        answered_at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>>;
}

/// Fixed interval per feedback value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedIntervalPolicy {
    correct_interval: Duration,
    hard_interval: Duration,
}

impl FixedIntervalPolicy {
    pub fn new(correct_interval: Duration, hard_interval: Duration) -> Result<Self> {
        let max_interval = Duration::days(MAX_INTERVAL_DAYS as i64);
        if correct_interval > max_interval || hard_interval > max_interval {
            return Err(AppError::Validation(format!(
                "review intervals must be at most {} days",
                MAX_INTERVAL_DAYS
            )));
        }
        if hard_interval <= Duration::zero() {
            return Err(AppError::Validation(
                "hard interval must be positive".to_string(),
            ));
        }
        if correct_interval <= hard_interval {
            return Err(AppError::Validation(format!(
                "correct interval ({}s) must be longer than hard interval ({}s)",
                correct_interval.num_seconds(),
                hard_interval.num_seconds()
            )));
        }

        Ok(Self {
            correct_interval,
            hard_interval,
        })
    }

    pub fn correct_interval(&self) -> Duration {
        self.correct_interval
    }

    pub fn hard_interval(&self) -> Duration {
        self.hard_interval
    }
}

impl Default for FixedIntervalPolicy {
    fn default() -> Self {
        Self {
            correct_interval: Duration::days(CORRECT_INTERVAL_DAYS as i64),
            hard_interval: Duration::days(HARD_INTERVAL_DAYS as i64),
        }
    }
}

impl ReviewPolicy for FixedIntervalPolicy {
    fn next_review(
        &self,
        feedback: Feedback,
        answered_at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let interval = match feedback {
            Feedback::Correct => self.correct_interval,
            Feedback::Hard => self.hard_interval,
            Feedback::Wrong => return Ok(answered_at),
        };

        answered_at.checked_add_signed(interval).ok_or_else(|| {
            AppError::Validation(format!(
                "next review for {} answer at {} is out of range",
                feedback,
                answered_at.to_rfc3339()
            ))
        })
    }
}

/// Next review time under the default policy
pub fn compute_next_review(
    feedback: Feedback,
    answered_at: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    FixedIntervalPolicy::default().next_review(feedback, answered_at)
}
