//! End-to-end analysis: load, join, derive, aggregate, test

use indicatif::ProgressBar;
use log::info;
use std::path::Path;
use std::time::Instant;

use crate::algorithm::aggregate::{
    adoption_rate_by_period, adoption_rate_by_status, length_of_stay_by_animal_type, save_rate,
    save_rate_by_condition, spay_neuter_rate_by_age,
};
use crate::algorithm::features::derive_all;
use crate::algorithm::hypothesis::{evaluate_all, shelter_hypotheses};
use crate::algorithm::join::join_episodes;
use crate::algorithm::stats::Rate;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::loader::{LoadStats, load_intakes, load_outcomes};
use crate::models::{IntakeRecord, OutcomeRecord, SexStatus};
use crate::report::Report;

/// Number of progress steps reported by [`analyze_files`]
pub const PIPELINE_STEPS: u64 = 5;

fn step(progress: Option<&ProgressBar>, message: &'static str) {
    if let Some(pb) = progress {
        pb.set_message(message);
        pb.inc(1);
    }
}

/// Run the analysis over already-loaded tables
pub fn analyze(
    config: &AnalysisConfig,
    intakes: &[IntakeRecord],
    outcomes: &[OutcomeRecord],
) -> Result<Report> {
    analyze_with_progress(config, intakes, outcomes, None)
}

fn analyze_with_progress(
    config: &AnalysisConfig,
    intakes: &[IntakeRecord],
    outcomes: &[OutcomeRecord],
    progress: Option<&ProgressBar>,
) -> Result<Report> {
    config.validate()?;
    let start = Instant::now();

    let joined = join_episodes(intakes, outcomes);
    step(progress, "deriving features");

    let features = derive_all(&joined.episodes);
    step(progress, "aggregating rates");

    // Outcome-level rates use every valid outcome row, orphans included
    let overall = save_rate(outcomes);
    let adoption = adoption_rate_by_period(outcomes, config.adoption_cutoff);
    let altered_during_stay = Rate::count_where(
        features
            .iter()
            .filter(|f| f.is_closed() && f.status_at_intake == SexStatus::Intact),
        |f| f.altered_during_stay(),
    );
    step(progress, "testing hypotheses");

    let hypotheses = shelter_hypotheses(&adoption, &features);
    let (tests, failed_tests) = evaluate_all(&hypotheses, config);

    info!("Analysis finished in {:?}", start.elapsed());

    Ok(Report {
        config: config.clone(),
        intake_load: LoadStats::default(),
        outcome_load: LoadStats::default(),
        join: joined.summary,
        save_rate: overall,
        adoption_by_period: adoption,
        spay_neuter_by_age: spay_neuter_rate_by_age(&features),
        save_rate_by_condition: save_rate_by_condition(&features),
        adoption_by_status: adoption_rate_by_status(&features),
        altered_during_stay,
        length_of_stay: length_of_stay_by_animal_type(&features),
        tests,
        failed_tests,
    })
}

/// Load both CSV tables and run the analysis
///
/// When a progress bar is given it advances [`PIPELINE_STEPS`] times.
pub fn analyze_files(
    config: &AnalysisConfig,
    intakes_path: &Path,
    outcomes_path: &Path,
    progress: Option<&ProgressBar>,
) -> Result<Report> {
    let (intakes, intake_load) = load_intakes(intakes_path)?;
    step(progress, "loading outcomes");

    let (outcomes, outcome_load) = load_outcomes(outcomes_path)?;
    step(progress, "joining episodes");

    let mut report = analyze_with_progress(config, &intakes, &outcomes, progress)?;
    report.intake_load = intake_load;
    report.outcome_load = outcome_load;
    Ok(report)
}
