//! Hypothesis definitions and test selection
//!
//! Each hypothesis declares the shape of its evidence: a pair of categorical
//! variables is tested for association with a chi-square test, a rate compared
//! across two periods with a two-proportion z-test.

use log::{info, warn};
use serde::Serialize;
use std::fmt;

use crate::algorithm::aggregate::{PeriodRates, status_and_outcome, status_by_age};
use crate::algorithm::features::EpisodeFeatures;
use crate::algorithm::stats::{
    ContingencyTable, Rate, TestStatistic, chi_square_independence, two_proportion_z_test,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::AgeBucket;

/// Statistical test applied to a hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestKind {
    ChiSquareIndependence,
    TwoProportionZ,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChiSquareIndependence => f.write_str("chi-square test of independence"),
            Self::TwoProportionZ => f.write_str("two-proportion z-test"),
        }
    }
}

/// Evidence for a hypothesis, which determines the test applied
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// Association between two categorical variables
    Association(ContingencyTable),
    /// Change in a rate between two groups
    ProportionChange { before: Rate, after: Rate },
}

impl Evidence {
    #[must_use]
    pub const fn test_kind(&self) -> TestKind {
        match self {
            Self::Association(_) => TestKind::ChiSquareIndependence,
            Self::ProportionChange { .. } => TestKind::TwoProportionZ,
        }
    }

    /// Run the test matching this evidence
    pub fn test(&self, config: &AnalysisConfig) -> Result<TestStatistic> {
        match self {
            Self::Association(table) => chi_square_independence(table, config.min_expected_count),
            Self::ProportionChange { before, after } => {
                two_proportion_z_test(*before, *after, config.min_group_size)
            }
        }
    }
}

/// A named hypothesis with its evidence
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub id: &'static str,
    pub statement: String,
    pub evidence: Evidence,
}

/// Decision for one hypothesis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub hypothesis: String,
    pub statement: String,
    pub test: TestKind,
    pub statistic: f64,
    pub degrees_of_freedom: Option<f64>,
    pub p_value: f64,
    pub alpha: f64,
    pub reject_null: bool,
}

/// A hypothesis whose test could not be run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTest {
    pub hypothesis: String,
    pub test: TestKind,
    pub reason: String,
}

impl Hypothesis {
    /// Test the hypothesis and decide against `config.alpha`
    pub fn evaluate(&self, config: &AnalysisConfig) -> Result<TestResult> {
        let stat = self.evidence.test(config)?;
        Ok(TestResult {
            hypothesis: self.id.to_string(),
            statement: self.statement.clone(),
            test: self.evidence.test_kind(),
            statistic: stat.statistic,
            degrees_of_freedom: stat.degrees_of_freedom,
            p_value: stat.p_value,
            alpha: config.alpha,
            reject_null: stat.p_value < config.alpha,
        })
    }
}

/// Build the four hypotheses of the shelter analysis
#[must_use]
pub fn shelter_hypotheses(adoption: &PeriodRates, features: &[EpisodeFeatures]) -> Vec<Hypothesis> {
    let age_status = ContingencyTable::from_pairs(
        status_by_age(features)
            .filter(|(bucket, _)| *bucket != AgeBucket::Unknown)
            .map(|(bucket, status)| (bucket, status.to_string())),
    );

    let condition_outcome = ContingencyTable::from_pairs(features.iter().filter_map(|f| {
        f.is_live_outcome()
            .map(|live| (f.intake_condition, if live { "live" } else { "not live" }))
    }));

    let status_adoption = ContingencyTable::from_pairs(
        status_and_outcome(features).map(|(status, kind)| {
            (
                status,
                if kind.is_adoption() {
                    "adopted"
                } else {
                    "not adopted"
                },
            )
        }),
    );

    vec![
        Hypothesis {
            id: "H1",
            statement: format!(
                "The adoption rate changed after {}",
                adoption.cutoff
            ),
            evidence: Evidence::ProportionChange {
                before: adoption.before,
                after: adoption.after,
            },
        },
        Hypothesis {
            id: "H2",
            statement: "Spay/neuter status at outcome is associated with age".to_string(),
            evidence: Evidence::Association(age_status),
        },
        Hypothesis {
            id: "H3",
            statement: "Leaving the shelter alive is associated with intake condition".to_string(),
            evidence: Evidence::Association(condition_outcome),
        },
        Hypothesis {
            id: "H4",
            statement: "Adoption is associated with spay/neuter status at outcome".to_string(),
            evidence: Evidence::Association(status_adoption),
        },
    ]
}

/// Evaluate every hypothesis, collecting failures instead of aborting
#[must_use]
pub fn evaluate_all(
    hypotheses: &[Hypothesis],
    config: &AnalysisConfig,
) -> (Vec<TestResult>, Vec<FailedTest>) {
    let mut results = Vec::new();
    let mut failures = Vec::new();

    for hypothesis in hypotheses {
        match hypothesis.evaluate(config) {
            Ok(result) => {
                info!(
                    "{}: {} p = {:.6} ({})",
                    result.hypothesis,
                    result.test,
                    result.p_value,
                    if result.reject_null {
                        "reject null"
                    } else {
                        "fail to reject null"
                    }
                );
                results.push(result);
            }
            Err(e) => {
                warn!("{} could not be tested: {e}", hypothesis.id);
                failures.push(FailedTest {
                    hypothesis: hypothesis.id.to_string(),
                    test: hypothesis.evidence.test_kind(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (results, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;

    fn period(before: Rate, after: Rate) -> PeriodRates {
        PeriodRates {
            cutoff: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            before,
            after,
        }
    }

    #[test]
    fn test_proportion_hypothesis_decision() {
        let config = AnalysisConfig::default();
        let hypothesis = Hypothesis {
            id: "H1",
            statement: "rates differ".into(),
            evidence: Evidence::ProportionChange {
                before: Rate::new(30, 100),
                after: Rate::new(45, 100),
            },
        };

        let result = hypothesis.evaluate(&config).unwrap();
        assert_eq!(result.test, TestKind::TwoProportionZ);
        assert!(result.reject_null);

        let strict = config.with_alpha(0.01);
        assert!(!hypothesis.evaluate(&strict).unwrap().reject_null);
    }

    #[test]
    fn test_insufficient_sample_fails_loudly() {
        let hypothesis = Hypothesis {
            id: "H1",
            statement: "rates differ".into(),
            evidence: Evidence::ProportionChange {
                before: Rate::new(1, 3),
                after: Rate::new(2, 4),
            },
        };
        assert!(matches!(
            hypothesis.evaluate(&AnalysisConfig::default()),
            Err(Error::InsufficientSample(_))
        ));
    }

    #[test]
    fn test_evaluate_all_collects_failures() {
        let hypotheses = shelter_hypotheses(&period(Rate::new(30, 100), Rate::new(45, 100)), &[]);
        assert_eq!(hypotheses.len(), 4);
        assert_eq!(
            hypotheses[1].evidence.test_kind(),
            TestKind::ChiSquareIndependence
        );

        let (results, failures) = evaluate_all(&hypotheses, &AnalysisConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hypothesis, "H1");
        let failed: Vec<&str> = failures.iter().map(|f| f.hypothesis.as_str()).collect();
        assert_eq!(failed, vec!["H2", "H3", "H4"]);
    }
}
