//! Domain models for shelter intake and outcome data

pub mod episode;
pub mod intake;
pub mod outcome;
pub mod types;

pub use episode::Episode;
pub use intake::IntakeRecord;
pub use outcome::OutcomeRecord;
pub use types::{AgeBucket, AnimalType, IntakeCondition, IntakeType, OutcomeType, Sex, SexStatus};
