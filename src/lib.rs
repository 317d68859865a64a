//! Analysis of animal shelter intake and outcome records.
//!
//! Loads the Austin Animal Center intake and outcome tables, pairs every
//! intake with the outcome that ended the stay, derives ages and spay/neuter
//! status, and tests hypotheses about adoption and save rates.

pub mod algorithm;
pub mod analysis;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod models;
pub mod report;
pub mod utils;

// Re-export the most common types for easier use
pub use analysis::{analyze, analyze_files};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use loader::{LoadStats, load_intakes, load_outcomes};
pub use models::{Episode, IntakeRecord, OutcomeRecord};
pub use report::Report;
