//! Potential-control dataset definition
//!
//! Controls are patients with no incident outcome diagnosis at all during
//! the study period, the same prior-outcome exclusion as the cases, and a
//! year of registration lead measured from the study start. The output
//! carries the demographic columns the matching step declares.

use std::sync::Arc;

use crate::algorithm::cohort::{
    AgeReference, AnchorRequirement, AnchorRule, DatasetDefinition, EligibilityRule,
    ExclusionHorizon, ExclusionRule, FeatureSpec, RegistrationReference,
};
use crate::codelist::CodeListRegistry;
use crate::config::StudyConfig;
use crate::error::Result;
use crate::study::codelists::keys;

/// Build the potential-control dataset definition
pub fn potential_control_dataset(
    registry: &CodeListRegistry,
    config: &StudyConfig,
) -> Result<DatasetDefinition> {
    let combo_outcome = registry.get(keys::COMBO_OUTCOME)?;

    let eligibility = EligibilityRule {
        anchor: AnchorRule::first_after(Arc::clone(&combo_outcome), config.study_start),
        anchor_requirement: AnchorRequirement::Absent,
        registration_reference: RegistrationReference::StudyStart,
        exclusions: vec![ExclusionRule {
            codelist: combo_outcome,
            horizon: ExclusionHorizon::OnOrBeforeStudyStart,
        }],
    };

    let mut dataset = DatasetDefinition::new("ctc_potential_controls", eligibility);

    dataset.push_feature(FeatureSpec::Sex {
        name: "sex".to_string(),
    });
    dataset.push_feature(FeatureSpec::AgeAt {
        name: "age".to_string(),
        reference: AgeReference::StudyStart,
    });
    dataset.push_feature(FeatureSpec::DateOfBirth {
        name: "date_of_birth".to_string(),
    });
    dataset.push_feature(FeatureSpec::ImdRounded {
        name: "imd".to_string(),
    });
    dataset.push_feature(FeatureSpec::ImdDecile {
        name: "imd_decile".to_string(),
    });

    Ok(dataset)
}
