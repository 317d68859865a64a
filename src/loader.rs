//! CSV loading for the intake and outcome tables
//!
//! Each table is read through a raw serde row type whose fields accept both
//! the API's snake_case headers and the portal's display headers. Rows that
//! lack an animal identifier or a parseable event datetime are skipped with a
//! warning; only file-level problems (unreadable file, missing required
//! column) abort a load.

use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::error::util::safe_open_file;
use crate::error::{Error, Result};
use crate::models::{IntakeRecord, OutcomeRecord};
use crate::utils::dates::truncate_to_minute;
use crate::utils::{non_empty, parse_date, parse_datetime};

/// Why a row was left out of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingAnimalId,
    InvalidDatetime,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAnimalId => f.write_str("missing animal id"),
            Self::InvalidDatetime => f.write_str("missing or unparseable datetime"),
        }
    }
}

/// Row counts for a single table load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub loaded: usize,
    pub missing_animal_id: usize,
    pub invalid_datetime: usize,
    /// Rows the CSV reader could not decode (wrong field count, bad UTF-8)
    pub malformed: usize,
}

impl LoadStats {
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.missing_animal_id + self.invalid_datetime + self.malformed
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::MissingAnimalId => self.missing_animal_id += 1,
            SkipReason::InvalidDatetime => self.invalid_datetime += 1,
        }
    }
}

/// A raw CSV row that can be validated into a typed record
pub trait SourceRow: DeserializeOwned {
    type Record;

    /// Table name used in logs and errors
    const TABLE: &'static str;

    /// Required columns, each listed with its accepted header spellings
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]];

    /// Validate the row
    fn into_record(self) -> std::result::Result<Self::Record, SkipReason>;
}

#[derive(Debug, Deserialize)]
struct RawIntakeRow {
    #[serde(alias = "Animal ID")]
    animal_id: Option<String>,
    #[serde(alias = "Name")]
    name: Option<String>,
    #[serde(alias = "DateTime")]
    datetime: Option<String>,
    #[serde(alias = "Found Location")]
    found_location: Option<String>,
    #[serde(alias = "Date of Birth")]
    date_of_birth: Option<String>,
    #[serde(alias = "Intake Type")]
    intake_type: Option<String>,
    #[serde(alias = "Intake Condition")]
    intake_condition: Option<String>,
    #[serde(alias = "Animal Type")]
    animal_type: Option<String>,
    #[serde(alias = "Sex upon Intake")]
    sex_upon_intake: Option<String>,
    #[serde(alias = "Age upon Intake")]
    age_upon_intake: Option<String>,
    #[serde(alias = "Breed")]
    breed: Option<String>,
    #[serde(alias = "Color")]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOutcomeRow {
    #[serde(alias = "Animal ID")]
    animal_id: Option<String>,
    #[serde(alias = "Name")]
    name: Option<String>,
    #[serde(alias = "DateTime")]
    datetime: Option<String>,
    #[serde(alias = "Date of Birth")]
    date_of_birth: Option<String>,
    #[serde(alias = "Outcome Type")]
    outcome_type: Option<String>,
    #[serde(alias = "Outcome Subtype")]
    outcome_subtype: Option<String>,
    #[serde(alias = "Animal Type")]
    animal_type: Option<String>,
    #[serde(alias = "Sex upon Outcome")]
    sex_upon_outcome: Option<String>,
    #[serde(alias = "Age upon Outcome")]
    age_upon_outcome: Option<String>,
    #[serde(alias = "Breed")]
    breed: Option<String>,
    #[serde(alias = "Color")]
    color: Option<String>,
}

const ANIMAL_ID_HEADERS: &[&str] = &["animal_id", "Animal ID"];
const DATETIME_HEADERS: &[&str] = &["datetime", "DateTime"];

fn clean(value: Option<String>) -> Option<String> {
    non_empty(value.as_deref()).map(str::to_string)
}

fn required_id(value: Option<String>) -> std::result::Result<String, SkipReason> {
    clean(value).ok_or(SkipReason::MissingAnimalId)
}

fn required_datetime(
    value: Option<String>,
) -> std::result::Result<chrono::NaiveDateTime, SkipReason> {
    non_empty(value.as_deref())
        .and_then(parse_datetime)
        .map(truncate_to_minute)
        .ok_or(SkipReason::InvalidDatetime)
}

fn optional_date(value: Option<String>) -> Option<chrono::NaiveDate> {
    non_empty(value.as_deref()).and_then(parse_date)
}

impl SourceRow for RawIntakeRow {
    type Record = IntakeRecord;

    const TABLE: &'static str = "intake";
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
        &[ANIMAL_ID_HEADERS, DATETIME_HEADERS];

    fn into_record(self) -> std::result::Result<IntakeRecord, SkipReason> {
        Ok(IntakeRecord {
            animal_id: required_id(self.animal_id)?,
            intake_datetime: required_datetime(self.datetime)?,
            name: clean(self.name),
            found_location: clean(self.found_location),
            date_of_birth: optional_date(self.date_of_birth),
            intake_type: clean(self.intake_type),
            intake_condition: clean(self.intake_condition),
            animal_type: clean(self.animal_type),
            sex_upon_intake: clean(self.sex_upon_intake),
            age_upon_intake: clean(self.age_upon_intake),
            breed: clean(self.breed),
            color: clean(self.color),
        })
    }
}

impl SourceRow for RawOutcomeRow {
    type Record = OutcomeRecord;

    const TABLE: &'static str = "outcome";
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
        &[ANIMAL_ID_HEADERS, DATETIME_HEADERS];

    fn into_record(self) -> std::result::Result<OutcomeRecord, SkipReason> {
        Ok(OutcomeRecord {
            animal_id: required_id(self.animal_id)?,
            outcome_datetime: required_datetime(self.datetime)?,
            name: clean(self.name),
            date_of_birth: optional_date(self.date_of_birth),
            outcome_type: clean(self.outcome_type),
            outcome_subtype: clean(self.outcome_subtype),
            animal_type: clean(self.animal_type),
            sex_upon_outcome: clean(self.sex_upon_outcome),
            age_upon_outcome: clean(self.age_upon_outcome),
            breed: clean(self.breed),
            color: clean(self.color),
        })
    }
}

fn check_headers<R: SourceRow>(headers: &csv::StringRecord) -> Result<()> {
    for accepted in R::REQUIRED_COLUMNS {
        let present = headers
            .iter()
            .any(|h| accepted.iter().any(|name| h.trim() == *name));
        if !present {
            return Err(Error::MissingColumn {
                table: R::TABLE,
                column: accepted.first().copied().unwrap_or_default().to_string(),
            });
        }
    }
    Ok(())
}

/// Read and validate every row of a table from any reader
pub fn read_table<R: SourceRow, S: Read>(source: S) -> Result<(Vec<R::Record>, LoadStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    check_headers::<R>(reader.headers()?)?;

    let mut records = Vec::new();
    let mut stats = LoadStats::default();

    for (index, row) in reader.deserialize::<R>().enumerate() {
        stats.rows_read += 1;
        // Header is line 1
        let line = index + 2;

        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping malformed {} row at line {line}: {e}", R::TABLE);
                stats.malformed += 1;
                continue;
            }
        };

        match raw.into_record() {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!("Skipping {} row at line {line}: {reason}", R::TABLE);
                stats.record_skip(reason);
            }
        }
    }

    stats.loaded = records.len();
    debug!("{} table stats: {stats:?}", R::TABLE);
    if stats.skipped() > 0 {
        warn!(
            "Skipped {} of {} {} rows",
            stats.skipped(),
            stats.rows_read,
            R::TABLE
        );
    }

    Ok((records, stats))
}

fn load_table<R: SourceRow>(path: &Path) -> Result<(Vec<R::Record>, LoadStats)> {
    let file = safe_open_file(path, &format!("reading the {} table", R::TABLE))?;
    let (records, stats) = read_table::<R, _>(std::io::BufReader::new(file))?;
    info!(
        "Loaded {} {} records from {}",
        stats.loaded,
        R::TABLE,
        path.display()
    );
    Ok((records, stats))
}

/// Load the intake table from a CSV file
pub fn load_intakes(path: &Path) -> Result<(Vec<IntakeRecord>, LoadStats)> {
    load_table::<RawIntakeRow>(path)
}

/// Load the outcome table from a CSV file
pub fn load_outcomes(path: &Path) -> Result<(Vec<OutcomeRecord>, LoadStats)> {
    load_table::<RawOutcomeRow>(path)
}

/// Parse the intake table from in-memory CSV text
pub fn read_intakes<S: Read>(source: S) -> Result<(Vec<IntakeRecord>, LoadStats)> {
    read_table::<RawIntakeRow, _>(source)
}

/// Parse the outcome table from in-memory CSV text
pub fn read_outcomes<S: Read>(source: S) -> Result<(Vec<OutcomeRecord>, LoadStats)> {
    read_table::<RawOutcomeRow, _>(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const API_INTAKES: &str = "\
animal_id,name,datetime,datetime2,found_location,intake_type,intake_condition,animal_type,sex_upon_intake,age_upon_intake,breed,color
A006100,Scamp,2017-12-07T14:07:00.000,2017-12-07T14:07:00.000,Colony Creek And Hunters Trace in Austin (TX),Stray,Normal,Dog,Neutered Male,10 years,Spinone Italiano Mix,Yellow/White
,NoId,2017-12-07T14:07:00.000,,Somewhere,Stray,Normal,Dog,Intact Male,1 year,Mix,Black
A006101,,not-a-date,,Somewhere,Stray,Normal,Cat,Intact Female,2 months,Domestic Shorthair,Black
A006102,*Bella,2019-05-08T18:20:35.000,,Austin (TX),Owner Surrender,Sick,Cat,Spayed Female,3 years,Domestic Shorthair,Tabby
";

    const PORTAL_OUTCOMES: &str = "\
Animal ID,Name,DateTime,MonthYear,Date of Birth,Outcome Type,Outcome Subtype,Animal Type,Sex upon Outcome,Age upon Outcome,Breed,Color
A794011,Chunk,05/08/2019 06:20:00 PM,May 2019,05/02/2017,Rto-Adopt,,Cat,Neutered Male,2 years,Domestic Shorthair Mix,Brown Tabby/White
A776359,Gizmo,07/18/2018 04:02:00 PM,Jul 2018,07/12/2017,Adoption,,Dog,Neutered Male,1 year,Chihuahua Shorthair Mix,White/Brown
A720371,Moose,02/13/2016 05:59:00 PM,Feb 2016,10/08/2015,,,Dog,Neutered Male,4 months,Anatol Shepherd/Labrador Retriever,Buff
";

    #[test]
    fn test_read_api_intakes_skips_bad_rows() {
        let (records, stats) = read_intakes(API_INTAKES.as_bytes()).unwrap();

        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.missing_animal_id, 1);
        assert_eq!(stats.invalid_datetime, 1);
        assert_eq!(stats.skipped(), 2);

        assert_eq!(records[0].animal_id, "A006100");
        assert_eq!(records[0].sex_upon_intake.as_deref(), Some("Neutered Male"));
        assert_eq!(records[0].date_of_birth, None);

        // Seconds are truncated
        let expected = NaiveDate::from_ymd_opt(2019, 5, 8)
            .unwrap()
            .and_hms_opt(18, 20, 0)
            .unwrap();
        assert_eq!(records[1].intake_datetime, expected);
    }

    #[test]
    fn test_read_portal_outcomes() {
        let (records, stats) = read_outcomes(PORTAL_OUTCOMES.as_bytes()).unwrap();

        assert_eq!(stats.loaded, 3);
        assert_eq!(
            records[0].date_of_birth,
            NaiveDate::from_ymd_opt(2017, 5, 2)
        );
        assert_eq!(records[0].outcome_type.as_deref(), Some("Rto-Adopt"));
        assert_eq!(records[0].outcome_subtype, None);
        // Blank outcome type is kept as missing, not dropped
        assert_eq!(records[2].outcome_type, None);
    }

    #[test]
    fn test_missing_required_column() {
        let csv_text = "animal_id,name\nA1,Rex\n";
        let err = read_intakes(csv_text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingColumn {
                table: "intake",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_row_is_counted() {
        let csv_text = "animal_id,datetime\nA1,2020-01-01 10:00\nA2,2020-01-02 10:00,extra\n";
        let (records, stats) = read_outcomes(csv_text.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.malformed, 1);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_intakes(Path::new("/no/such/intakes.csv")).is_err());
    }
}
