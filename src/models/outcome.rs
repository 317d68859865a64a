//! Outcome record model

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::types::OutcomeType;

/// One row of the outcome table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRecord {
    pub animal_id: String,
    pub name: Option<String>,
    pub outcome_datetime: NaiveDateTime,
    pub date_of_birth: Option<NaiveDate>,
    pub outcome_type: Option<String>,
    pub outcome_subtype: Option<String>,
    pub animal_type: Option<String>,
    pub sex_upon_outcome: Option<String>,
    pub age_upon_outcome: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
}

impl OutcomeRecord {
    /// Create an outcome with only the identifying fields set
    #[must_use]
    pub fn new(animal_id: impl Into<String>, outcome_datetime: NaiveDateTime) -> Self {
        Self {
            animal_id: animal_id.into(),
            name: None,
            outcome_datetime,
            date_of_birth: None,
            outcome_type: None,
            outcome_subtype: None,
            animal_type: None,
            sex_upon_outcome: None,
            age_upon_outcome: None,
            breed: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, outcome_type: impl Into<String>) -> Self {
        self.outcome_type = Some(outcome_type.into());
        self
    }

    #[must_use]
    pub fn with_birth_date(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = Some(date_of_birth);
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex_upon_outcome = Some(sex.into());
        self
    }

    /// Normalized outcome type, `None` when the column was blank
    #[must_use]
    pub fn kind(&self) -> Option<OutcomeType> {
        self.outcome_type.as_deref().map(OutcomeType::from)
    }
}
