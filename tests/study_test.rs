//! End-to-end pipeline over generated dummy data and the shipped code lists

use std::path::Path;

use ehr_cohort::algorithm::cohort::CohortAssembler;
use ehr_cohort::algorithm::matching::{Matcher, MatchingConfig};
use ehr_cohort::dummy::DummyDataGenerator;
use ehr_cohort::models::EventStore;
use ehr_cohort::study::measures::TREND_INTERVAL_MONTHS;
use ehr_cohort::study::{
    case_dataset, load_study_codelists, potential_control_dataset, tendinitis_dataset,
    trend_measures,
};
use ehr_cohort::{FeatureValue, StudyConfig};

fn pipeline_config() -> StudyConfig {
    StudyConfig {
        dummy_population_size: 400,
        random_seed: Some(99),
        ..StudyConfig::default()
    }
}

#[test]
fn case_dataset_declares_the_expected_columns() {
    let registry = load_study_codelists(Path::new("codelists")).unwrap();
    let config = pipeline_config();

    let definition = case_dataset(&registry, &config).unwrap();
    let columns = definition.column_names();

    // 8 scalar columns plus 6 antibiotics x 2 periods x 2 outcomes
    assert_eq!(columns.len(), 32);
    assert!(columns.contains(&"potential_case_date"));
    assert!(columns.contains(&"amoxicillin_risk_tendinitis"));
    assert!(columns.contains(&"fluoroquinolones_reference_neuropathy"));
    assert!(definition.validate().is_ok());
}

#[test]
fn tendinitis_dataset_declares_the_expected_columns() {
    let registry = load_study_codelists(Path::new("codelists")).unwrap();
    let config = pipeline_config();

    let definition = tendinitis_dataset(&registry, &config).unwrap();
    let columns = definition.column_names();

    // 4 scalar columns plus 6 antibiotics x 2 periods x 1 outcome
    assert_eq!(columns.len(), 16);
    assert!(columns.contains(&"tendinitis_case"));
    assert!(columns.contains(&"cefalexin_reference_tendinitis"));
}

#[test]
fn full_pipeline_runs_over_dummy_data() {
    let registry = load_study_codelists(Path::new("codelists")).unwrap();
    let config = pipeline_config();

    let store = DummyDataGenerator::new(&config, &registry).generate().unwrap();
    assert_eq!(store.patient_count(), 400);

    // Derive cases and controls
    let cases_definition = case_dataset(&registry, &config).unwrap();
    let case_rows = CohortAssembler::new(&config, &cases_definition)
        .assemble(&store)
        .unwrap();
    assert!(!case_rows.is_empty());

    let controls_definition = potential_control_dataset(&registry, &config).unwrap();
    let control_rows = CohortAssembler::new(&config, &controls_definition)
        .assemble(&store)
        .unwrap();
    assert!(!control_rows.is_empty());

    // Every case has an anchor date and a full set of columns
    for row in &case_rows {
        assert!(row.get("potential_case_date").unwrap().as_date().is_some());
        assert_eq!(row.len(), 32);
    }

    // No patient is both a case and a control
    for case in &case_rows {
        assert!(
            control_rows
                .iter()
                .all(|control| control.patient_id != case.patient_id)
        );
    }

    // Rows are sorted by patient id
    for pair in case_rows.windows(2) {
        assert!(pair[0].patient_id < pair[1].patient_id);
    }

    // Matching consumes the two tables as written
    let matcher = Matcher::new(MatchingConfig {
        random_seed: config.random_seed,
        ..MatchingConfig::default()
    });
    let matched = matcher.perform_matching(&case_rows, &control_rows).unwrap();
    assert_eq!(matched.report.total_cases, case_rows.len());
    for set in &matched.sets {
        assert!(set.control_ids.len() <= 3);
        assert!(set.index_date.is_some());
    }
}

#[test]
fn derived_flags_are_always_present_booleans() {
    let registry = load_study_codelists(Path::new("codelists")).unwrap();
    let config = pipeline_config();

    let store = DummyDataGenerator::new(&config, &registry).generate().unwrap();
    let definition = case_dataset(&registry, &config).unwrap();
    let rows = CohortAssembler::new(&config, &definition)
        .assemble(&store)
        .unwrap();

    for row in &rows {
        for column in definition.column_names() {
            if column.contains("_risk_") || column.contains("_reference_") {
                assert!(
                    matches!(row.get(column), Some(FeatureValue::Bool(_))),
                    "column {column} should be a boolean flag"
                );
            }
        }
    }
}

#[test]
fn trend_measures_cover_every_interval() {
    let registry = load_study_codelists(Path::new("codelists")).unwrap();
    let config = StudyConfig {
        dummy_population_size: 150,
        random_seed: Some(3),
        ..StudyConfig::default()
    };

    let store = DummyDataGenerator::new(&config, &registry).generate().unwrap();
    let measures = trend_measures(&registry, &config).unwrap();
    let rows = measures.evaluate(&store).unwrap();

    // Four measures over the monthly partition
    assert_eq!(rows.len(), 4 * TREND_INTERVAL_MONTHS as usize);

    // Rows are grouped by measure with intervals in order
    assert_eq!(rows[0].measure, "fluoroquinolone_trends");
    assert_eq!(rows[0].interval_start, config.study_start);
    for pair in rows.windows(2) {
        if pair[0].measure == pair[1].measure {
            assert!(pair[0].interval_start < pair[1].interval_start);
        }
    }
}
