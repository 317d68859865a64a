//! Algorithm implementations for the shelter outcome analysis
//!
//! The pipeline stages live in their own modules: joining intakes to
//! outcomes, deriving per-episode features, aggregating rates and testing
//! hypotheses.

pub mod aggregate;
pub mod features;
pub mod hypothesis;
pub mod join;
pub mod stats;

pub use aggregate::{GroupRate, PeriodRates, StaySummary};
pub use features::{EpisodeFeatures, derive_features};
pub use hypothesis::{Evidence, Hypothesis, TestKind, TestResult};
pub use join::{JoinResult, JoinSummary, join_episodes};
pub use stats::{ContingencyTable, Rate, TestStatistic};
