//! Study scheduling
//!
//! Pure functions over persisted state: the review-interval policy, the
//! partitioning of a deck into the study queue, and deck statistics.
//! Nothing here touches storage; every decision is recomputed from the
//! feedback log and the current time.

pub mod policy;
pub mod queue;
pub mod stats;

pub use crate::database::Feedback;
pub use policy::{compute_next_review, FixedIntervalPolicy, ReviewPolicy};
pub use queue::{
    build_study_queue, classify, latest_feedback_per_card, partition, StudyGroup, StudyPartition,
};
pub use stats::{compute_stats, CategoryStats};
