//! Intake record model

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One row of the intake table
///
/// An animal re-entering the shelter produces a new row with the same
/// `animal_id`, so the identifier is not unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeRecord {
    pub animal_id: String,
    pub name: Option<String>,
    pub intake_datetime: NaiveDateTime,
    pub found_location: Option<String>,
    /// Not published in the intake export; populated when a source provides it
    pub date_of_birth: Option<NaiveDate>,
    pub intake_type: Option<String>,
    pub intake_condition: Option<String>,
    pub animal_type: Option<String>,
    pub sex_upon_intake: Option<String>,
    pub age_upon_intake: Option<String>,
    pub breed: Option<String>,
    pub color: Option<String>,
}

impl IntakeRecord {
    /// Create an intake with only the identifying fields set
    #[must_use]
    pub fn new(animal_id: impl Into<String>, intake_datetime: NaiveDateTime) -> Self {
        Self {
            animal_id: animal_id.into(),
            name: None,
            intake_datetime,
            found_location: None,
            date_of_birth: None,
            intake_type: None,
            intake_condition: None,
            animal_type: None,
            sex_upon_intake: None,
            age_upon_intake: None,
            breed: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_animal_type(mut self, animal_type: impl Into<String>) -> Self {
        self.animal_type = Some(animal_type.into());
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.intake_condition = Some(condition.into());
        self
    }

    #[must_use]
    pub fn with_sex(mut self, sex: impl Into<String>) -> Self {
        self.sex_upon_intake = Some(sex.into());
        self
    }

    #[must_use]
    pub fn with_age_text(mut self, age: impl Into<String>) -> Self {
        self.age_upon_intake = Some(age.into());
        self
    }
}
