//! Configuration for the shelter outcome analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::util::safe_open_file;
use crate::error::{Error, Result};

/// Configuration for an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Outcomes before this date fall in the "pre" period, the rest in "post"
    pub adoption_cutoff: NaiveDate,
    /// Significance threshold for every hypothesis test
    pub alpha: f64,
    /// Minimum number of observations per group for a proportion test
    pub min_group_size: usize,
    /// Minimum expected cell count for a chi-square test
    pub min_expected_count: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            adoption_cutoff: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or(NaiveDate::MIN),
            alpha: 0.05,
            min_group_size: 10,
            min_expected_count: 5.0,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = safe_open_file(path, "analysis configuration")?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub const fn with_cutoff(mut self, cutoff: NaiveDate) -> Self {
        self.adoption_cutoff = cutoff;
        self
    }

    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Check that thresholds are usable
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::Config(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }
        if self.min_group_size == 0 {
            return Err(Error::Config("min_group_size must be at least 1".into()));
        }
        if !(self.min_expected_count.is_finite() && self.min_expected_count >= 0.0) {
            return Err(Error::Config(format!(
                "min_expected_count must be a non-negative number, got {}",
                self.min_expected_count
            )));
        }
        Ok(())
    }
}

impl fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Configuration:")?;
        writeln!(f, "  Adoption Cutoff: {}", self.adoption_cutoff)?;
        writeln!(f, "  Alpha: {}", self.alpha)?;
        writeln!(f, "  Minimum Group Size: {}", self.min_group_size)?;
        writeln!(f, "  Minimum Expected Count: {}", self.min_expected_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_alpha_out_of_range() {
        let config = AnalysisConfig::default().with_alpha(1.5);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        let config = AnalysisConfig::default().with_alpha(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"adoption_cutoff": "2021-06-01", "alpha": 0.01}}"#).unwrap();

        let config = AnalysisConfig::from_json_file(file.path()).unwrap();
        assert_eq!(
            config.adoption_cutoff,
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
        );
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.min_group_size, 10);
    }

    #[test]
    fn test_display_lists_cutoff() {
        let text = AnalysisConfig::default().to_string();
        assert!(text.contains("Adoption Cutoff: 2020-03-01"));
    }
}
