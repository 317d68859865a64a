//! Group-wise rates over outcomes and episodes

use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::algorithm::features::EpisodeFeatures;
use crate::algorithm::stats::Rate;
use crate::models::{AgeBucket, AnimalType, OutcomeRecord, OutcomeType, SexStatus};

/// A rate for one category of a grouping variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRate {
    pub group: String,
    pub rate: Rate,
}

/// Rates before and after a cutoff date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodRates {
    pub cutoff: NaiveDate,
    pub before: Rate,
    pub after: Rate,
}

/// Length-of-stay summary for one animal type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaySummary {
    pub animal_type: AnimalType,
    pub episodes: usize,
    pub median_days: f64,
    pub mean_days: f64,
}

fn grouped<K: Ord + Display>(map: BTreeMap<K, Rate>) -> Vec<GroupRate> {
    map.into_iter()
        .map(|(group, rate)| GroupRate {
            group: group.to_string(),
            rate,
        })
        .collect()
}

/// Share of outcomes where the animal left alive
///
/// Outcomes without an outcome type are left out of the denominator.
#[must_use]
pub fn save_rate<'a>(outcomes: impl IntoIterator<Item = &'a OutcomeRecord>) -> Rate {
    Rate::count_where(
        outcomes.into_iter().filter_map(OutcomeRecord::kind),
        |kind| kind.is_live(),
    )
}

/// Adoption rate among outcomes before and after `cutoff`
///
/// An outcome at exactly midnight on the cutoff date counts as "after".
#[must_use]
pub fn adoption_rate_by_period<'a>(
    outcomes: impl IntoIterator<Item = &'a OutcomeRecord>,
    cutoff: NaiveDate,
) -> PeriodRates {
    let boundary = cutoff.and_time(NaiveTime::MIN);
    let mut rates = PeriodRates {
        cutoff,
        before: Rate::default(),
        after: Rate::default(),
    };

    for outcome in outcomes {
        let Some(kind) = outcome.kind() else {
            continue;
        };
        let period = if outcome.outcome_datetime < boundary {
            &mut rates.before
        } else {
            &mut rates.after
        };
        period.observe(kind.is_adoption());
    }

    rates
}

/// Spay/neuter rate at outcome per age bucket
///
/// Only closed episodes with a known status at outcome contribute.
#[must_use]
pub fn spay_neuter_rate_by_age(features: &[EpisodeFeatures]) -> Vec<GroupRate> {
    let mut buckets: BTreeMap<AgeBucket, Rate> = BTreeMap::new();
    for (bucket, status) in status_by_age(features) {
        buckets.entry(bucket).or_default().observe(status.is_altered());
    }
    grouped(buckets)
}

/// `(age bucket at outcome, status at outcome)` for closed episodes with a known status
pub fn status_by_age(
    features: &[EpisodeFeatures],
) -> impl Iterator<Item = (AgeBucket, SexStatus)> + '_ {
    features.iter().filter_map(|f| {
        let status = f.status_at_outcome.filter(|s| s.is_known())?;
        let bucket = f.age_at_outcome.map_or(AgeBucket::Unknown, |a| a.bucket);
        Some((bucket, status))
    })
}

/// Live-outcome rate per intake condition over closed episodes
#[must_use]
pub fn save_rate_by_condition(features: &[EpisodeFeatures]) -> Vec<GroupRate> {
    let mut conditions = BTreeMap::new();
    for f in features {
        if let Some(live) = f.is_live_outcome() {
            conditions
                .entry(f.intake_condition)
                .or_insert_with(Rate::default)
                .observe(live);
        }
    }
    grouped(conditions)
}

/// Adoption rate per spay/neuter status at outcome
#[must_use]
pub fn adoption_rate_by_status(features: &[EpisodeFeatures]) -> Vec<GroupRate> {
    let mut statuses = BTreeMap::new();
    for (status, kind) in status_and_outcome(features) {
        statuses
            .entry(status)
            .or_insert_with(Rate::default)
            .observe(kind.is_adoption());
    }
    grouped(statuses)
}

/// `(status at outcome, outcome type)` for closed episodes with a known status
pub fn status_and_outcome(
    features: &[EpisodeFeatures],
) -> impl Iterator<Item = (SexStatus, OutcomeType)> + '_ {
    features.iter().filter_map(|f| {
        let kind = f.outcome_type?;
        let status = f.status_at_outcome.filter(|s| s.is_known())?;
        Some((status, kind))
    })
}

fn median(sorted: &[i64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    }
}

/// Median and mean length of stay per animal type over closed episodes
#[must_use]
pub fn length_of_stay_by_animal_type(features: &[EpisodeFeatures]) -> Vec<StaySummary> {
    features
        .iter()
        .filter_map(|f| f.length_of_stay_days.map(|days| (f.animal_type, days)))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(animal_type, _)| *animal_type)
        .map(|(animal_type, mut stays)| {
            stays.sort_unstable();
            let total: i64 = stays.iter().sum();
            StaySummary {
                animal_type,
                episodes: stays.len(),
                median_days: median(&stays),
                mean_days: total as f64 / stays.len() as f64,
            }
        })
        .collect()
}
