//! Combined case dataset definition
//!
//! Cases are patients whose first tendinitis or peripheral-neuropathy
//! diagnosis falls strictly after the study start, with a year of
//! registration lead around that date and no prior outcome diagnosis on or
//! before the study start. Output columns carry the incident outcome dates,
//! demographics and covariates, and an exposure flag for every antibiotic,
//! window period and outcome combination.

use std::sync::Arc;

use crate::algorithm::cohort::{
    AgeReference, AnchorRequirement, AnchorRule, AnchorSource, DatasetDefinition,
    EligibilityRule, ExclusionHorizon, ExclusionRule, FeatureSpec, RegistrationReference,
    exposure_flag_grid,
};
use crate::algorithm::window::{Offset, TimeWindow};
use crate::codelist::{CodeList, CodeListRegistry};
use crate::config::StudyConfig;
use crate::error::Result;
use crate::query::DateBounds;
use crate::study::codelists::{ANTIBIOTIC_KEYS, keys};

/// Exposure lookback windows shared by the case-time-control definitions
pub fn study_periods() -> Result<Vec<(&'static str, TimeWindow)>> {
    Ok(vec![
        ("risk", TimeWindow::new(Offset::days(30), Offset::days(1))?),
        (
            "reference",
            TimeWindow::new(Offset::days(180), Offset::days(151))?,
        ),
    ])
}

/// The study antibiotics as (label, code list) pairs in column order
pub fn antibiotic_exposures(
    registry: &CodeListRegistry,
) -> Result<Vec<(&'static str, Arc<CodeList>)>> {
    ANTIBIOTIC_KEYS
        .iter()
        .map(|key| Ok((*key, registry.get(key)?)))
        .collect()
}

/// Build the combined case dataset definition
pub fn case_dataset(
    registry: &CodeListRegistry,
    config: &StudyConfig,
) -> Result<DatasetDefinition> {
    let combo_outcome = registry.get(keys::COMBO_OUTCOME)?;
    let tendinitis = registry.get(keys::TENDINITIS)?;
    let neuropathy = registry.get(keys::PERIPHERAL_NEUROPATHY)?;

    let eligibility = EligibilityRule {
        anchor: AnchorRule::first_after(Arc::clone(&combo_outcome), config.study_start),
        anchor_requirement: AnchorRequirement::Present,
        registration_reference: RegistrationReference::Anchor,
        exclusions: vec![ExclusionRule {
            codelist: combo_outcome,
            horizon: ExclusionHorizon::OnOrBeforeStudyStart,
        }],
    };

    let mut dataset = DatasetDefinition::new("ctc_cases", eligibility);

    dataset.push_feature(FeatureSpec::AnchorDate {
        name: "potential_case_date".to_string(),
    });
    dataset.push_feature(FeatureSpec::Sex {
        name: "sex".to_string(),
    });
    dataset.push_feature(FeatureSpec::AgeAt {
        name: "age".to_string(),
        reference: AgeReference::Anchor,
    });
    dataset.push_feature(FeatureSpec::FirstEventDate {
        name: "incident_tendinitis".to_string(),
        codelist: Arc::clone(&tendinitis),
        bounds: DateBounds::unbounded().after(config.study_start),
    });
    dataset.push_feature(FeatureSpec::FirstEventDate {
        name: "incident_neuropathy".to_string(),
        codelist: Arc::clone(&neuropathy),
        bounds: DateBounds::unbounded().after(config.study_start),
    });
    dataset.push_feature(FeatureSpec::DispensingCountInWindow {
        name: "abx_rx_count_12m".to_string(),
        exposure: registry.get(keys::ALL_ANTIBIOTICS)?,
        window: TimeWindow::new(Offset::months(12), Offset::days(1))?,
        anchor: AnchorSource::Population,
    });
    dataset.push_feature(FeatureSpec::Categorical {
        name: "smoking_status".to_string(),
        codelist: registry.get(keys::SMOKING)?,
        never_category: Some("N".to_string()),
    });
    dataset.push_feature(FeatureSpec::Categorical {
        name: "ethnicity".to_string(),
        codelist: registry.get(keys::ETHNICITY)?,
        never_category: None,
    });

    let outcomes = [
        ("tendinitis", AnchorSource::FirstEvent(tendinitis)),
        ("neuropathy", AnchorSource::FirstEvent(neuropathy)),
    ];
    dataset.extend_features(exposure_flag_grid(
        &antibiotic_exposures(registry)?,
        &study_periods()?,
        &outcomes,
    ));

    Ok(dataset)
}
