use chrono::{Duration, NaiveDate, NaiveDateTime};
use shelter_outcomes::algorithm::{Rate, TestKind, join_episodes};
use shelter_outcomes::models::AnimalType;
use shelter_outcomes::{AnalysisConfig, analyze, analyze_files, load_intakes, load_outcomes};
use std::fmt::Write as _;
use std::path::Path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn api_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// Write a synthetic pair of API-style exports large enough for every test
fn write_synthetic_exports(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut intakes = String::from(
        "animal_id,name,datetime,datetime2,found_location,intake_type,intake_condition,animal_type,sex_upon_intake,age_upon_intake,breed,color\n",
    );
    let mut outcomes = String::from(
        "animal_id,name,datetime,monthyear,date_of_birth,outcome_type,outcome_subtype,animal_type,sex_upon_outcome,age_upon_outcome,breed,color\n",
    );

    let base = NaiveDate::from_ymd_opt(2019, 1, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let ages = [180, 730, 1826, 3287];

    for i in 0..240_i64 {
        let id = format!("A{i:05}");
        let intake_at = base + Duration::days(i * 3);
        let outcome_at = intake_at + Duration::days(5);
        let dob = (intake_at - Duration::days(ages[(i % 4) as usize])).date();

        let condition = if i % 2 == 0 { "Normal" } else { "Sick" };
        let animal = if i % 2 == 0 { "Dog" } else { "Cat" };
        let (intake_sex, outcome_sex) = match i % 3 {
            0 => ("Intact Male", "Intact Male"),
            1 => ("Intact Female", "Spayed Female"),
            _ => ("Neutered Male", "Neutered Male"),
        };
        let outcome_type = match i % 5 {
            0 | 1 => "Adoption",
            2 => "Transfer",
            3 => "Euthanasia",
            _ => "Return to Owner",
        };

        writeln!(
            intakes,
            "{id},Pet,{dt},{dt},Austin (TX),Stray,{condition},{animal},{intake_sex},1 year,Mix,Black",
            dt = api_datetime(intake_at)
        )
        .unwrap();
        writeln!(
            outcomes,
            "{id},Pet,{dt},{dt},{dob}T00:00:00.000,{outcome_type},,{animal},{outcome_sex},1 year,Mix,Black",
            dt = api_datetime(outcome_at)
        )
        .unwrap();

        // A later re-intake that is still open
        if i % 40 == 0 {
            writeln!(
                intakes,
                "{id},Pet,{dt},{dt},Austin (TX),Owner Surrender,Normal,{animal},{outcome_sex},1 year,Mix,Black",
                dt = api_datetime(outcome_at + Duration::days(30))
            )
            .unwrap();
        }
    }

    // Rows that must be skipped, and an outcome with no intake
    intakes.push_str(",Pet,2019-01-01T10:00:00.000,,Austin (TX),Stray,Normal,Dog,Intact Male,1 year,Mix,Black\n");
    outcomes.push_str("A99999,Pet,garbage,,2018-01-01T00:00:00.000,Adoption,,Dog,Intact Male,1 year,Mix,Black\n");
    outcomes.push_str("Z00001,Pet,2019-06-01T10:00:00.000,,2018-01-01T00:00:00.000,Adoption,,Dog,Intact Male,1 year,Mix,Black\n");

    let intakes_path = dir.join("intakes.csv");
    let outcomes_path = dir.join("outcomes.csv");
    std::fs::write(&intakes_path, intakes).unwrap();
    std::fs::write(&outcomes_path, outcomes).unwrap();
    (intakes_path, outcomes_path)
}

#[test]
fn test_portal_fixture_pipeline() {
    let report = analyze_files(
        &AnalysisConfig::default(),
        &fixture("portal_intakes.csv"),
        &fixture("portal_outcomes.csv"),
        None,
    )
    .unwrap();

    assert_eq!(report.intake_load.loaded, 5);
    assert_eq!(report.intake_load.missing_animal_id, 1);
    assert_eq!(report.outcome_load.loaded, 5);
    assert_eq!(report.outcome_load.invalid_datetime, 1);

    assert_eq!(report.join.episodes, 5);
    assert_eq!(report.join.closed, 4);
    assert_eq!(report.join.open, 1);
    assert_eq!(report.join.orphan_outcomes, 1);

    assert_eq!(report.save_rate, Rate::new(4, 5));

    let dogs = report
        .length_of_stay
        .iter()
        .find(|s| s.animal_type == AnimalType::Dog)
        .unwrap();
    assert_eq!(dogs.episodes, 3);
    assert_eq!(dogs.median_days, 4.0);

    // Far too little data for any test: every hypothesis is reported as failed
    assert!(report.tests.is_empty());
    assert_eq!(report.failed_tests.len(), 4);
}

#[test]
fn test_episodes_never_end_before_they_start() {
    let (intakes, _) = load_intakes(&fixture("portal_intakes.csv")).unwrap();
    let (outcomes, _) = load_outcomes(&fixture("portal_outcomes.csv")).unwrap();

    let joined = join_episodes(&intakes, &outcomes);
    for episode in &joined.episodes {
        if let Some(outcome_at) = episode.outcome_datetime() {
            assert!(outcome_at >= episode.intake_datetime());
        }
    }
}

#[test]
fn test_synthetic_exports_full_report() {
    let tmp = tempfile::tempdir().unwrap();
    let (intakes_path, outcomes_path) = write_synthetic_exports(tmp.path());

    let report = analyze_files(
        &AnalysisConfig::default(),
        &intakes_path,
        &outcomes_path,
        None,
    )
    .unwrap();

    assert_eq!(report.intake_load.loaded, 246);
    assert_eq!(report.intake_load.skipped(), 1);
    assert_eq!(report.outcome_load.loaded, 241);
    assert_eq!(report.outcome_load.invalid_datetime, 1);

    assert_eq!(report.join.closed, 240);
    assert_eq!(report.join.open, 6);
    assert_eq!(report.join.orphan_outcomes, 1);

    // 48 euthanasia outcomes out of 240, plus the orphan adoption
    assert_eq!(report.save_rate, Rate::new(193, 241));
    assert_eq!(
        report.adoption_by_period.before.denominator + report.adoption_by_period.after.denominator,
        241
    );
    assert_eq!(report.altered_during_stay, Rate::new(80, 160));

    let entries = report.rate_entries();
    assert!(!entries.is_empty());
    for entry in &entries {
        if let Some(v) = entry.value {
            assert!((0.0..=1.0).contains(&v), "{} {} = {v}", entry.table, entry.group);
        }
    }

    assert_eq!(report.tests.len(), 4, "failed: {:?}", report.failed_tests);
    let ids: Vec<&str> = report.tests.iter().map(|t| t.hypothesis.as_str()).collect();
    assert_eq!(ids, vec!["H1", "H2", "H3", "H4"]);
    assert_eq!(report.tests[0].test, TestKind::TwoProportionZ);

    // Status is independent of age bucket by construction
    let h2 = &report.tests[1];
    assert!(h2.statistic.abs() < 1e-9);
    assert!(!h2.reject_null);

    for test in &report.tests {
        assert!((0.0..=1.0).contains(&test.p_value));
    }

    let files = report.write_to_dir(&tmp.path().join("report")).unwrap();
    assert!(files.json.exists());
    assert!(files.rates_csv.exists());
}

#[test]
fn test_p_values_are_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    let (intakes_path, outcomes_path) = write_synthetic_exports(tmp.path());
    let (intakes, _) = load_intakes(&intakes_path).unwrap();
    let (outcomes, _) = load_outcomes(&outcomes_path).unwrap();

    let config = AnalysisConfig::default();
    let first = analyze(&config, &intakes, &outcomes).unwrap();
    let second = analyze(&config, &intakes, &outcomes).unwrap();
    assert_eq!(first.tests, second.tests);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = AnalysisConfig::default().with_alpha(2.0);
    assert!(analyze(&config, &[], &[]).is_err());
}
