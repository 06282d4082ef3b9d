//! Tendinitis-only case dataset definition
//!
//! Variant of the combined case dataset anchored on tendinitis alone: the
//! anchor, the exclusion and every exposure flag use only the tendinitis
//! outcome.

use std::sync::Arc;

use crate::algorithm::cohort::{
    AgeReference, AnchorRequirement, AnchorRule, AnchorSource, DatasetDefinition,
    EligibilityRule, ExclusionHorizon, ExclusionRule, FeatureSpec, RegistrationReference,
    exposure_flag_grid,
};
use crate::codelist::CodeListRegistry;
use crate::config::StudyConfig;
use crate::error::Result;
use crate::study::cases::{antibiotic_exposures, study_periods};
use crate::study::codelists::keys;

/// Build the tendinitis-only case dataset definition
pub fn tendinitis_dataset(
    registry: &CodeListRegistry,
    config: &StudyConfig,
) -> Result<DatasetDefinition> {
    let tendinitis = registry.get(keys::TENDINITIS)?;

    let eligibility = EligibilityRule {
        anchor: AnchorRule::first_after(Arc::clone(&tendinitis), config.study_start),
        anchor_requirement: AnchorRequirement::Present,
        registration_reference: RegistrationReference::Anchor,
        exclusions: vec![ExclusionRule {
            codelist: Arc::clone(&tendinitis),
            horizon: ExclusionHorizon::OnOrBeforeStudyStart,
        }],
    };

    let mut dataset = DatasetDefinition::new("ctc_tendinitis_cases", eligibility);

    dataset.push_feature(FeatureSpec::AnchorExists {
        name: "tendinitis_case".to_string(),
    });
    dataset.push_feature(FeatureSpec::Sex {
        name: "sex".to_string(),
    });
    dataset.push_feature(FeatureSpec::AgeAt {
        name: "age".to_string(),
        reference: AgeReference::Anchor,
    });
    dataset.push_feature(FeatureSpec::AnchorDate {
        name: "tendinitis_case_date".to_string(),
    });

    let outcomes = [("tendinitis", AnchorSource::Population)];
    dataset.extend_features(exposure_flag_grid(
        &antibiotic_exposures(registry)?,
        &study_periods()?,
        &outcomes,
    ));

    Ok(dataset)
}
