//! Per-episode feature derivation
//!
//! Turns the free-text columns of an episode into normalized categories and
//! computes ages, spay/neuter status and length of stay.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::models::{
    AgeBucket, AnimalType, Episode, IntakeCondition, IntakeType, OutcomeRecord, OutcomeType, Sex,
    SexStatus,
};
use crate::utils::{days_between, days_to_years, parse_age_text};

/// Age of an animal at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeAtEvent {
    pub days: f64,
    /// Years rounded to one decimal
    pub years: f64,
    pub bucket: AgeBucket,
}

impl AgeAtEvent {
    /// Age from a fractional number of days; negative ages are rejected
    #[must_use]
    pub fn from_days(days: f64) -> Option<Self> {
        if !days.is_finite() || days < 0.0 {
            return None;
        }
        let years = days_to_years(days);
        Some(Self {
            days,
            years,
            bucket: AgeBucket::from_years(Some(years)),
        })
    }
}

/// Age at `event` from a date of birth, falling back to "N years" style text
#[must_use]
pub fn age_at_event(
    date_of_birth: Option<NaiveDate>,
    event: NaiveDateTime,
    age_text: Option<&str>,
) -> Option<AgeAtEvent> {
    let from_birth = date_of_birth
        .map(|dob| days_between(dob.and_time(NaiveTime::MIN), event))
        .filter(|days| *days >= 0)
        .and_then(|days| AgeAtEvent::from_days(days as f64));

    from_birth.or_else(|| age_text.and_then(parse_age_text).and_then(AgeAtEvent::from_days))
}

/// Normalized view of one episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeFeatures {
    pub animal_id: String,
    pub intake_datetime: NaiveDateTime,
    pub outcome_datetime: Option<NaiveDateTime>,
    pub animal_type: AnimalType,
    pub intake_type: IntakeType,
    pub intake_condition: IntakeCondition,
    pub sex: Sex,
    pub status_at_intake: SexStatus,
    pub status_at_outcome: Option<SexStatus>,
    pub age_at_intake: Option<AgeAtEvent>,
    pub age_at_outcome: Option<AgeAtEvent>,
    pub outcome_type: Option<OutcomeType>,
    /// Whole days between intake and outcome
    pub length_of_stay_days: Option<i64>,
}

impl EpisodeFeatures {
    /// Intact at intake and altered at outcome
    #[must_use]
    pub fn altered_during_stay(&self) -> bool {
        self.status_at_intake == SexStatus::Intact
            && self.status_at_outcome == Some(SexStatus::Altered)
    }

    #[must_use]
    pub fn is_live_outcome(&self) -> Option<bool> {
        self.outcome_type.map(OutcomeType::is_live)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outcome_datetime.is_some()
    }
}

fn text(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

/// Derive the features of an episode
#[must_use]
pub fn derive_features(episode: &Episode<'_>) -> EpisodeFeatures {
    let intake = episode.intake;
    let outcome: Option<&OutcomeRecord> = episode.outcome;

    // The intake export carries no birth date, so borrow it from the outcome
    let date_of_birth = intake
        .date_of_birth
        .or_else(|| outcome.and_then(|o| o.date_of_birth));

    let animal_type = intake
        .animal_type
        .as_ref()
        .or_else(|| outcome.and_then(|o| o.animal_type.as_ref()));

    let status_at_intake = SexStatus::from(text(intake.sex_upon_intake.as_ref()));
    let status_at_outcome = outcome.map(|o| SexStatus::from(text(o.sex_upon_outcome.as_ref())));

    let sex = match Sex::from(text(intake.sex_upon_intake.as_ref())) {
        Sex::Unknown => outcome
            .map(|o| Sex::from(text(o.sex_upon_outcome.as_ref())))
            .unwrap_or(Sex::Unknown),
        known => known,
    };

    EpisodeFeatures {
        animal_id: intake.animal_id.clone(),
        intake_datetime: intake.intake_datetime,
        outcome_datetime: outcome.map(|o| o.outcome_datetime),
        animal_type: AnimalType::from(text(animal_type)),
        intake_type: IntakeType::from(text(intake.intake_type.as_ref())),
        intake_condition: IntakeCondition::from(text(intake.intake_condition.as_ref())),
        sex,
        status_at_intake,
        status_at_outcome,
        age_at_intake: age_at_event(
            date_of_birth,
            intake.intake_datetime,
            intake.age_upon_intake.as_deref(),
        ),
        age_at_outcome: outcome.and_then(|o| {
            age_at_event(
                date_of_birth,
                o.outcome_datetime,
                o.age_upon_outcome.as_deref(),
            )
        }),
        outcome_type: outcome.and_then(OutcomeRecord::kind),
        length_of_stay_days: outcome
            .map(|o| days_between(intake.intake_datetime, o.outcome_datetime)),
    }
}

/// Derive features for every episode, preserving order
#[must_use]
pub fn derive_all(episodes: &[Episode<'_>]) -> Vec<EpisodeFeatures> {
    episodes.iter().map(derive_features).collect()
}
