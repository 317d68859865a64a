//! Intake/outcome episodes
//!
//! An episode is one stay at the shelter: an intake together with the outcome
//! that ended it. Episodes borrow from the loaded tables and are rebuilt on
//! every analysis run.

use chrono::NaiveDateTime;

use crate::models::{IntakeRecord, OutcomeRecord};

/// One stay at the shelter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode<'a> {
    pub intake: &'a IntakeRecord,
    /// `None` while the animal is still in the shelter
    pub outcome: Option<&'a OutcomeRecord>,
}

impl<'a> Episode<'a> {
    #[must_use]
    pub const fn open(intake: &'a IntakeRecord) -> Self {
        Self {
            intake,
            outcome: None,
        }
    }

    #[must_use]
    pub const fn closed(intake: &'a IntakeRecord, outcome: &'a OutcomeRecord) -> Self {
        Self {
            intake,
            outcome: Some(outcome),
        }
    }

    #[must_use]
    pub fn animal_id(&self) -> &'a str {
        &self.intake.animal_id
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.outcome.is_none()
    }

    #[must_use]
    pub const fn intake_datetime(&self) -> NaiveDateTime {
        self.intake.intake_datetime
    }

    #[must_use]
    pub fn outcome_datetime(&self) -> Option<NaiveDateTime> {
        self.outcome.map(|o| o.outcome_datetime)
    }
}
