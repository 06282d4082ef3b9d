use log::{info, warn};
use std::path::Path;
use std::time::Instant;

use ehr_cohort::algorithm::cohort::CohortAssembler;
use ehr_cohort::algorithm::matching::{Matcher, MatchingConfig};
use ehr_cohort::dummy::DummyDataGenerator;
use ehr_cohort::models::EventStore;
use ehr_cohort::study::{
    case_dataset, load_study_codelists, potential_control_dataset, tendinitis_dataset,
    trend_measures,
};
use ehr_cohort::{Result, StudyConfig, output};

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let codelist_dir = Path::new("codelists");
    if !codelist_dir.exists() {
        warn!("Code list directory not found: {}", codelist_dir.display());
        return Ok(());
    }

    let config = StudyConfig {
        random_seed: Some(20_101_201),
        ..StudyConfig::default()
    };
    info!("{config}");

    let registry = load_study_codelists(codelist_dir)?;

    // Synthetic population standing in for the real event store
    let store = DummyDataGenerator::new(&config, &registry).generate()?;
    info!("Event store ready with {} patients", store.patient_count());

    let start = Instant::now();
    let output_dir = Path::new("output");

    // Case datasets
    let cases_definition = case_dataset(&registry, &config)?;
    let case_rows = CohortAssembler::new(&config, &cases_definition).assemble(&store)?;
    output::write_feature_table(
        &output_dir.join("ctc_data.csv"),
        &cases_definition.column_names(),
        &case_rows,
    )?;

    let tendinitis_definition = tendinitis_dataset(&registry, &config)?;
    let tendinitis_rows =
        CohortAssembler::new(&config, &tendinitis_definition).assemble(&store)?;
    output::write_feature_table(
        &output_dir.join("ctc_data_tendinitis.csv"),
        &tendinitis_definition.column_names(),
        &tendinitis_rows,
    )?;

    // Potential controls
    let controls_definition = potential_control_dataset(&registry, &config)?;
    let control_rows = CohortAssembler::new(&config, &controls_definition).assemble(&store)?;
    output::write_feature_table(
        &output_dir.join("ctc_data_controls.csv"),
        &controls_definition.column_names(),
        &control_rows,
    )?;

    // Match cases to controls on sex and age
    let matcher = Matcher::new(MatchingConfig {
        random_seed: config.random_seed,
        ..MatchingConfig::default()
    });
    let matched = matcher.perform_matching(&case_rows, &control_rows)?;
    output::write_matched_sets(&output_dir.join("matched_cases.csv"), &matched)?;
    output::write_matching_report(&output_dir.join("matching_report.json"), &matched)?;
    info!("Matching completed in {:?}", matched.matching_time);

    // Monthly trend measures
    let measures = trend_measures(&registry, &config)?;
    let measure_rows = measures.evaluate(&store)?;
    output::write_measures(&output_dir.join("measures.csv"), &measure_rows)?;

    info!("Pipeline completed in {:?}", start.elapsed());
    Ok(())
}
