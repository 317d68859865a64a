//! Analysis report and its text, JSON and CSV renderings

use log::info;
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::algorithm::aggregate::{GroupRate, PeriodRates, StaySummary};
use crate::algorithm::hypothesis::{FailedTest, TestResult};
use crate::algorithm::join::JoinSummary;
use crate::algorithm::stats::Rate;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::error::util::{ensure_directory, safe_create_file};
use crate::loader::LoadStats;

/// Everything computed by one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub config: AnalysisConfig,
    pub intake_load: LoadStats,
    pub outcome_load: LoadStats,
    pub join: JoinSummary,
    pub save_rate: Rate,
    pub adoption_by_period: PeriodRates,
    pub spay_neuter_by_age: Vec<GroupRate>,
    pub save_rate_by_condition: Vec<GroupRate>,
    pub adoption_by_status: Vec<GroupRate>,
    /// Among closed episodes intact at intake, share altered by outcome
    pub altered_during_stay: Rate,
    pub length_of_stay: Vec<StaySummary>,
    pub tests: Vec<TestResult>,
    pub failed_tests: Vec<FailedTest>,
}

/// One row of the flat rates table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateEntry {
    pub table: &'static str,
    pub group: String,
    pub numerator: u64,
    pub denominator: u64,
    pub value: Option<f64>,
}

impl RateEntry {
    fn new(table: &'static str, group: impl Into<String>, rate: Rate) -> Self {
        Self {
            table,
            group: group.into(),
            numerator: rate.numerator,
            denominator: rate.denominator,
            value: rate.value(),
        }
    }
}

/// Files written by [`Report::write_to_dir`]
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub text: PathBuf,
    pub json: PathBuf,
    pub rates_csv: PathBuf,
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn write_group_table(out: &mut String, title: &str, rows: &[GroupRate]) -> fmt::Result {
    writeln!(out, "{title}")?;
    if rows.is_empty() {
        return writeln!(out, "  (no data)\n");
    }
    for row in rows {
        writeln!(out, "  {:<20} {}", truncate_string(&row.group, 20), row.rate)?;
    }
    writeln!(out)
}

impl Report {
    /// Flatten every rate into one table
    #[must_use]
    pub fn rate_entries(&self) -> Vec<RateEntry> {
        let mut entries = vec![
            RateEntry::new("save_rate", "all", self.save_rate),
            RateEntry::new(
                "adoption_by_period",
                format!("before {}", self.adoption_by_period.cutoff),
                self.adoption_by_period.before,
            ),
            RateEntry::new(
                "adoption_by_period",
                format!("from {}", self.adoption_by_period.cutoff),
                self.adoption_by_period.after,
            ),
            RateEntry::new("altered_during_stay", "intact at intake", self.altered_during_stay),
        ];

        let grouped = [
            ("spay_neuter_by_age", &self.spay_neuter_by_age),
            ("save_rate_by_condition", &self.save_rate_by_condition),
            ("adoption_by_status", &self.adoption_by_status),
        ];
        for (table, rows) in grouped {
            entries.extend(
                rows.iter()
                    .map(|row| RateEntry::new(table, row.group.clone(), row.rate)),
            );
        }

        entries
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the flat rates table as CSV
    pub fn write_rates_csv(&self, path: &Path) -> Result<()> {
        let file = safe_create_file(path, "rates table")?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        for entry in self.rate_entries() {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write `report.txt`, `report.json` and `rates.csv` into `dir`
    pub fn write_to_dir(&self, dir: &Path) -> Result<ReportFiles> {
        ensure_directory(dir, "report output")?;

        let files = ReportFiles {
            text: dir.join("report.txt"),
            json: dir.join("report.json"),
            rates_csv: dir.join("rates.csv"),
        };

        std::fs::write(&files.text, self.to_string())
            .map_err(|e| crate::error::Error::from(e).with_path(&files.text))?;
        std::fs::write(&files.json, self.to_json()?)
            .map_err(|e| crate::error::Error::from(e).with_path(&files.json))?;
        self.write_rates_csv(&files.rates_csv)?;

        info!("Report written to {}", dir.display());
        Ok(files)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        writeln!(out, "Shelter Outcome Analysis")?;
        writeln!(out, "========================\n")?;
        write!(out, "{}", self.config)?;
        writeln!(out)?;

        writeln!(out, "Data:")?;
        for (table, stats) in [("intake", &self.intake_load), ("outcome", &self.outcome_load)] {
            writeln!(
                out,
                "  {table:<8} rows read: {}, loaded: {}, skipped: {} (missing id: {}, bad datetime: {}, malformed: {})",
                stats.rows_read,
                stats.loaded,
                stats.skipped(),
                stats.missing_animal_id,
                stats.invalid_datetime,
                stats.malformed
            )?;
        }
        writeln!(
            out,
            "  episodes: {} ({} closed, {} open), orphan outcomes: {}\n",
            self.join.episodes, self.join.closed, self.join.open, self.join.orphan_outcomes
        )?;

        writeln!(out, "Save rate: {}\n", self.save_rate)?;
        writeln!(out, "Adoption rate (cutoff {}):", self.adoption_by_period.cutoff)?;
        writeln!(out, "  before               {}", self.adoption_by_period.before)?;
        writeln!(out, "  after                {}\n", self.adoption_by_period.after)?;
        writeln!(out, "Spayed/neutered during stay: {}\n", self.altered_during_stay)?;

        let tables = [
            ("Spay/neuter rate by age at outcome:", &self.spay_neuter_by_age),
            ("Save rate by intake condition:", &self.save_rate_by_condition),
            ("Adoption rate by spay/neuter status:", &self.adoption_by_status),
        ];
        for (title, rows) in tables {
            write_group_table(&mut out, title, rows)?;
        }

        writeln!(out, "Length of stay by animal type:")?;
        writeln!(
            out,
            "  Animal Type | Episodes | Median Days | Mean Days\n  ------------|----------|-------------|----------"
        )?;
        for stay in &self.length_of_stay {
            writeln!(
                out,
                "  {:<11} | {:>8} | {:>11.1} | {:>9.1}",
                stay.animal_type.to_string(),
                stay.episodes,
                stay.median_days,
                stay.mean_days
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Hypothesis tests:")?;
        for test in &self.tests {
            writeln!(
                out,
                "  {} {} ({}): statistic = {:.4}{}, p = {:.6} -> {}",
                test.hypothesis,
                test.statement,
                test.test,
                test.statistic,
                test.degrees_of_freedom
                    .map(|df| format!(", df = {df}"))
                    .unwrap_or_default(),
                test.p_value,
                if test.reject_null {
                    format!("reject at alpha {}", test.alpha)
                } else {
                    format!("not significant at alpha {}", test.alpha)
                }
            )?;
        }
        for failed in &self.failed_tests {
            writeln!(
                out,
                "  {} ({}): not tested, {}",
                failed.hypothesis, failed.test, failed.reason
            )?;
        }

        f.write_str(&out)
    }
}
