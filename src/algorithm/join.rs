//! Intake/outcome joining
//!
//! Intakes and outcomes are grouped by animal identifier. Within an animal,
//! intakes are walked in chronological order and each one claims the earliest
//! unclaimed outcome that falls inside its window: at or after its own
//! datetime and no later than the animal's next intake. An intake with no
//! outcome in its window stays open. Outcomes nobody claims are orphans.

use itertools::Itertools;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::models::{Episode, IntakeRecord, OutcomeRecord};

/// Counts describing a join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub episodes: usize,
    pub closed: usize,
    pub open: usize,
    /// Outcomes with no intake in range to pair with
    pub orphan_outcomes: usize,
    /// Records ignored because their animal id was blank
    pub excluded_records: usize,
}

/// Episodes built from one intake table and one outcome table
#[derive(Debug, Clone)]
pub struct JoinResult<'a> {
    pub episodes: Vec<Episode<'a>>,
    pub orphan_outcomes: Vec<&'a OutcomeRecord>,
    pub summary: JoinSummary,
}

/// Pair every intake with the outcome that ended that stay
///
/// Episodes are returned ordered by animal id, then intake datetime.
#[must_use]
pub fn join_episodes<'a>(
    intakes: &'a [IntakeRecord],
    outcomes: &'a [OutcomeRecord],
) -> JoinResult<'a> {
    let mut excluded = 0;

    let mut outcomes_by_animal: FxHashMap<&'a str, Vec<&'a OutcomeRecord>> =
        FxHashMap::default();
    for outcome in outcomes {
        let id = outcome.animal_id.trim();
        if id.is_empty() {
            warn!("Excluding outcome at {} with no animal id", outcome.outcome_datetime);
            excluded += 1;
            continue;
        }
        outcomes_by_animal.entry(id).or_default().push(outcome);
    }

    let mut intakes_by_animal: FxHashMap<&'a str, Vec<&'a IntakeRecord>> = FxHashMap::default();
    for intake in intakes {
        let id = intake.animal_id.trim();
        if id.is_empty() {
            warn!("Excluding intake at {} with no animal id", intake.intake_datetime);
            excluded += 1;
            continue;
        }
        intakes_by_animal.entry(id).or_default().push(intake);
    }

    let mut episodes = Vec::with_capacity(intakes.len());
    let mut orphan_outcomes = Vec::new();

    for animal_id in intakes_by_animal.keys().copied().sorted_unstable() {
        let animal_intakes = &intakes_by_animal[animal_id];
        let animal_outcomes = outcomes_by_animal.remove(animal_id).unwrap_or_default();
        let (animal_episodes, unclaimed) = pair_animal(animal_intakes, animal_outcomes);
        episodes.extend(animal_episodes);
        orphan_outcomes.extend(unclaimed);
    }

    // Animals that only appear in the outcome table
    for (_, rest) in outcomes_by_animal
        .into_iter()
        .sorted_unstable_by_key(|(id, _)| *id)
    {
        orphan_outcomes.extend(rest);
    }

    let closed = episodes.iter().filter(|e| !e.is_open()).count();
    let summary = JoinSummary {
        episodes: episodes.len(),
        closed,
        open: episodes.len() - closed,
        orphan_outcomes: orphan_outcomes.len(),
        excluded_records: excluded,
    };

    info!(
        "Joined {} episodes ({} closed, {} open), {} orphan outcomes",
        summary.episodes, summary.closed, summary.open, summary.orphan_outcomes
    );

    JoinResult {
        episodes,
        orphan_outcomes,
        summary,
    }
}

/// Pair the stays of a single animal
fn pair_animal<'a>(
    intakes: &[&'a IntakeRecord],
    mut outcomes: Vec<&'a OutcomeRecord>,
) -> (Vec<Episode<'a>>, Vec<&'a OutcomeRecord>) {
    let intakes: Vec<&'a IntakeRecord> = intakes
        .iter()
        .copied()
        .sorted_by_key(|i| i.intake_datetime)
        .collect();
    outcomes.sort_by_key(|o| o.outcome_datetime);

    let mut claimed = vec![false; outcomes.len()];
    let mut episodes = Vec::with_capacity(intakes.len());

    for (idx, intake) in intakes.iter().enumerate() {
        let start = intake.intake_datetime;
        let end = intakes.get(idx + 1).map(|next| next.intake_datetime);

        let candidate = outcomes.iter().enumerate().find(|(pos, outcome)| {
            !claimed[*pos]
                && outcome.outcome_datetime >= start
                && end.is_none_or(|end| outcome.outcome_datetime <= end)
        });

        match candidate {
            Some((pos, outcome)) => {
                claimed[pos] = true;
                episodes.push(Episode::closed(*intake, *outcome));
            }
            None => {
                debug!("Intake of {} at {start} has no outcome yet", intake.animal_id);
                episodes.push(Episode::open(*intake));
            }
        }
    }

    let unclaimed = outcomes
        .into_iter()
        .zip(claimed)
        .filter_map(|(outcome, used)| (!used).then_some(outcome))
        .collect();

    (episodes, unclaimed)
}
