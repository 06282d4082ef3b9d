use chrono::NaiveDate;

use ehr_cohort::algorithm::matching::{MatchVariable, Matcher, MatchingConfig};
use ehr_cohort::models::{FeatureRow, FeatureValue, PatientId};
use ehr_cohort::CohortError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn case_row(id: u64, sex: &str, age: i64, index_date: NaiveDate) -> FeatureRow {
    let mut row = FeatureRow::new(PatientId(id));
    row.push("potential_case_date", FeatureValue::Date(Some(index_date)));
    row.push("sex", FeatureValue::Category(Some(sex.to_string())));
    row.push("age", FeatureValue::Int(Some(age)));
    row
}

fn control_row(id: u64, sex: &str, age: i64) -> FeatureRow {
    let mut row = FeatureRow::new(PatientId(id));
    row.push("sex", FeatureValue::Category(Some(sex.to_string())));
    row.push("age", FeatureValue::Int(Some(age)));
    row
}

fn seeded_config(matches_per_case: usize) -> MatchingConfig {
    MatchingConfig {
        matches_per_case,
        random_seed: Some(42),
        ..MatchingConfig::default()
    }
}

#[test]
fn matches_respect_sex_exactly_and_age_within_tolerance() {
    let cases = vec![case_row(1, "female", 50, date(2022, 6, 1))];
    let controls = vec![
        control_row(10, "male", 50),   // wrong sex
        control_row(11, "female", 56), // outside +-5
        control_row(12, "female", 53), // eligible
        control_row(13, "female", 45), // eligible
    ];

    let result = Matcher::new(seeded_config(3))
        .perform_matching(&cases, &controls)
        .unwrap();

    assert_eq!(result.sets.len(), 1);
    let mut matched = result.sets[0].control_ids.clone();
    matched.sort();
    assert_eq!(matched, vec![PatientId(12), PatientId(13)]);
    assert_eq!(result.sets[0].index_date, Some(date(2022, 6, 1)));
}

#[test]
fn nearest_age_wins_when_controls_are_plentiful() {
    let cases = vec![case_row(1, "female", 50, date(2022, 6, 1))];
    let controls = vec![
        control_row(10, "female", 55),
        control_row(11, "female", 50),
        control_row(12, "female", 47),
    ];

    let result = Matcher::new(seeded_config(1))
        .perform_matching(&cases, &controls)
        .unwrap();

    assert_eq!(result.sets[0].control_ids, vec![PatientId(11)]);
}

#[test]
fn controls_are_used_without_replacement() {
    let cases = vec![
        case_row(1, "male", 60, date(2021, 1, 1)),
        case_row(2, "male", 60, date(2022, 1, 1)),
    ];
    let controls = vec![control_row(10, "male", 60), control_row(11, "male", 61)];

    let result = Matcher::new(seeded_config(1))
        .perform_matching(&cases, &controls)
        .unwrap();

    assert_eq!(result.sets.len(), 2);
    let first = result.sets[0].control_ids[0];
    let second = result.sets[1].control_ids[0];
    assert_ne!(first, second);
    assert_eq!(result.report.controls_used, 2);
}

#[test]
fn unmatched_cases_are_reported_not_failed() {
    let cases = vec![
        case_row(1, "female", 50, date(2022, 6, 1)),
        case_row(2, "male", 90, date(2022, 6, 1)),
    ];
    let controls = vec![control_row(10, "female", 50)];

    let result = Matcher::new(seeded_config(1))
        .perform_matching(&cases, &controls)
        .unwrap();

    assert_eq!(result.report.total_cases, 2);
    assert_eq!(result.report.matched_cases, 1);
    assert_eq!(result.report.match_count_distribution.get(&0), Some(&1));
    assert_eq!(result.report.match_count_distribution.get(&1), Some(&1));
}

#[test]
fn matching_is_reproducible_with_a_seed() {
    let cases: Vec<FeatureRow> = (1..=20)
        .map(|id| case_row(id, "female", 40 + (id as i64 % 10), date(2022, 1, 1)))
        .collect();
    let controls: Vec<FeatureRow> = (100..=200)
        .map(|id| control_row(id, "female", 35 + (id as i64 % 20)))
        .collect();

    let matcher = Matcher::new(seeded_config(3));
    let first = matcher.perform_matching(&cases, &controls).unwrap();
    let second = matcher.perform_matching(&cases, &controls).unwrap();

    for (a, b) in first.sets.iter().zip(second.sets.iter()) {
        assert_eq!(a.case_id, b.case_id);
        assert_eq!(a.control_ids, b.control_ids);
    }
}

#[test]
fn missing_matching_column_is_a_configuration_error() {
    let mut case = FeatureRow::new(PatientId(1));
    case.push("sex", FeatureValue::Category(Some("female".to_string())));
    // no age, no potential_case_date
    let controls = vec![control_row(10, "female", 50)];

    let result = Matcher::new(seeded_config(1)).perform_matching(&[case], &controls);
    assert!(matches!(result, Err(CohortError::ConfigurationError(_))));
}

#[test]
fn rows_with_missing_values_are_dropped_from_the_pool() {
    let cases = vec![case_row(1, "female", 50, date(2022, 6, 1))];
    let mut incomplete = FeatureRow::new(PatientId(10));
    incomplete.push("sex", FeatureValue::Category(None));
    incomplete.push("age", FeatureValue::Int(Some(50)));
    let controls = vec![incomplete, control_row(11, "female", 50)];

    let result = Matcher::new(seeded_config(2))
        .perform_matching(&cases, &controls)
        .unwrap();

    assert_eq!(result.sets[0].control_ids, vec![PatientId(11)]);
}

#[test]
fn zero_matches_per_case_is_rejected() {
    let config = MatchingConfig {
        matches_per_case: 0,
        ..MatchingConfig::default()
    };
    let cases = vec![case_row(1, "female", 50, date(2022, 6, 1))];
    let controls = vec![control_row(10, "female", 50)];

    let result = Matcher::new(config).perform_matching(&cases, &controls);
    assert!(matches!(result, Err(CohortError::ConfigurationError(_))));
}

#[test]
fn category_only_matching_scans_the_whole_pool() {
    let config = MatchingConfig {
        matches_per_case: 2,
        variables: vec![MatchVariable::Category {
            column: "sex".to_string(),
        }],
        index_date_column: "potential_case_date".to_string(),
        random_seed: Some(7),
    };
    let cases = vec![case_row(1, "male", 50, date(2022, 6, 1))];
    let controls = vec![
        control_row(10, "male", 20),
        control_row(11, "female", 50),
        control_row(12, "male", 80),
    ];

    let result = Matcher::new(config).perform_matching(&cases, &controls).unwrap();
    let mut matched = result.sets[0].control_ids.clone();
    matched.sort();
    assert_eq!(matched, vec![PatientId(10), PatientId(12)]);
}
