//! Game components: round generation, answer evaluation and statistics.
//!
//! Each component borrows a store bound only to the collaborator traits in
//! [`crate::repo`], so tests can drive them against an in-memory store.

mod answer;
mod round;
mod stats;

pub use answer::{AnswerEvaluator, AnswerOutcome, Submission};
pub use round::{expire_stale_rounds, RoundGenerator};
pub use stats::StatsAggregator;
