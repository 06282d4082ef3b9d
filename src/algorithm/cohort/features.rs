//! Declarative feature specifications
//!
//! A dataset's output columns are declared once as a list of specs and then
//! evaluated uniformly per patient. The exposure-by-window-by-outcome grids
//! that dominate the study definitions are generated by `exposure_flag_grid`
//! rather than assigned one by one.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::algorithm::anchor::first_event_date;
use crate::algorithm::cohort::categories::derive_category;
use crate::algorithm::window::{TimeWindow, count_in_window, exposed_in_window};
use crate::codelist::CodeList;
use crate::config::StudyConfig;
use crate::models::{FeatureValue, PatientData};
use crate::query::DateBounds;

/// Which date a window-based feature is anchored on
#[derive(Debug, Clone)]
pub enum AnchorSource {
    /// The population anchor resolved by the eligibility rule
    Population,
    /// The first event in the given list strictly after the study start
    FirstEvent(Arc<CodeList>),
}

impl AnchorSource {
    fn resolve(
        &self,
        data: &PatientData,
        population_anchor: Option<NaiveDate>,
        config: &StudyConfig,
    ) -> Option<NaiveDate> {
        match self {
            Self::Population => population_anchor,
            Self::FirstEvent(codelist) => first_event_date(
                &data.clinical_events,
                codelist,
                &DateBounds::unbounded().after(config.study_start),
            ),
        }
    }
}

/// Reference date for an age column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeReference {
    /// Age at the population anchor
    Anchor,
    /// Age at the study start
    StudyStart,
}

/// One output column and how to derive it
#[derive(Debug, Clone)]
pub enum FeatureSpec {
    /// Flag: the population anchor resolved for this patient
    AnchorExists {
        /// Column name
        name: String,
    },
    /// The population anchor date itself
    AnchorDate {
        /// Column name
        name: String,
    },
    /// Recorded sex
    Sex {
        /// Column name
        name: String,
    },
    /// Date of birth
    DateOfBirth {
        /// Column name
        name: String,
    },
    /// Rounded IMD value
    ImdRounded {
        /// Column name
        name: String,
    },
    /// IMD decile
    ImdDecile {
        /// Column name
        name: String,
    },
    /// Age in completed years at a reference date
    AgeAt {
        /// Column name
        name: String,
        /// Which date the age is computed at
        reference: AgeReference,
    },
    /// Date of the first event in a list within bounds
    FirstEventDate {
        /// Column name
        name: String,
        /// Code list qualifying events may match
        codelist: Arc<CodeList>,
        /// Date bounds on qualifying events
        bounds: DateBounds,
    },
    /// Flag: any dispensing in the window before the anchor
    ExposureInWindow {
        /// Column name
        name: String,
        /// Code list of qualifying dispensings
        exposure: Arc<CodeList>,
        /// Lookback window before the anchor
        window: TimeWindow,
        /// Which anchor the window is measured from
        anchor: AnchorSource,
    },
    /// Count of dispensings in the window before the anchor
    DispensingCountInWindow {
        /// Column name
        name: String,
        /// Code list of qualifying dispensings
        exposure: Arc<CodeList>,
        /// Lookback window before the anchor
        window: TimeWindow,
        /// Which anchor the window is measured from
        anchor: AnchorSource,
    },
    /// Category of the most recent mapped event on or before the anchor
    Categorical {
        /// Column name
        name: String,
        /// Category-mapped code list
        codelist: Arc<CodeList>,
        /// Category assigned only in the absence of any other mapping
        never_category: Option<String>,
    },
}

impl FeatureSpec {
    /// The output column name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::AnchorExists { name }
            | Self::AnchorDate { name }
            | Self::Sex { name }
            | Self::DateOfBirth { name }
            | Self::ImdRounded { name }
            | Self::ImdDecile { name }
            | Self::AgeAt { name, .. }
            | Self::FirstEventDate { name, .. }
            | Self::ExposureInWindow { name, .. }
            | Self::DispensingCountInWindow { name, .. }
            | Self::Categorical { name, .. } => name,
        }
    }

    /// Evaluate the column for one patient
    ///
    /// Total over patient data: absence of events or anchor produces
    /// `false`, `None` or `0`, never an error.
    #[must_use]
    pub fn evaluate(
        &self,
        data: &PatientData,
        population_anchor: Option<NaiveDate>,
        config: &StudyConfig,
    ) -> FeatureValue {
        match self {
            Self::AnchorExists { .. } => FeatureValue::Bool(population_anchor.is_some()),
            Self::AnchorDate { .. } => FeatureValue::Date(population_anchor),
            Self::Sex { .. } => {
                FeatureValue::Category(Some(data.patient.sex.as_str().to_string()))
            }
            Self::DateOfBirth { .. } => FeatureValue::Date(data.patient.date_of_birth),
            Self::ImdRounded { .. } => {
                FeatureValue::Int(data.patient.imd_rounded.map(i64::from))
            }
            Self::ImdDecile { .. } => {
                FeatureValue::Int(data.patient.imd_decile.map(i64::from))
            }
            Self::AgeAt { reference, .. } => {
                let reference_date = match reference {
                    AgeReference::Anchor => population_anchor,
                    AgeReference::StudyStart => Some(config.study_start),
                };
                FeatureValue::Int(
                    reference_date
                        .and_then(|date| data.patient.age_on(date))
                        .map(i64::from),
                )
            }
            Self::FirstEventDate {
                codelist, bounds, ..
            } => FeatureValue::Date(first_event_date(&data.clinical_events, codelist, bounds)),
            Self::ExposureInWindow {
                exposure,
                window,
                anchor,
                ..
            } => {
                let anchor_date = anchor.resolve(data, population_anchor, config);
                FeatureValue::Bool(exposed_in_window(
                    &data.dispensings,
                    exposure,
                    anchor_date,
                    window,
                ))
            }
            Self::DispensingCountInWindow {
                exposure,
                window,
                anchor,
                ..
            } => {
                let anchor_date = anchor.resolve(data, population_anchor, config);
                let count = count_in_window(&data.dispensings, exposure, anchor_date, window);
                FeatureValue::Int(Some(count as i64))
            }
            Self::Categorical {
                codelist,
                never_category,
                ..
            } => FeatureValue::Category(derive_category(
                &data.clinical_events,
                codelist,
                population_anchor,
                never_category.as_deref(),
            )),
        }
    }
}

/// Generate `{exposure}_{period}_{outcome}` flag columns for every
/// combination of the given exposures, window periods and outcome anchors
#[must_use]
pub fn exposure_flag_grid(
    exposures: &[(&str, Arc<CodeList>)],
    periods: &[(&str, TimeWindow)],
    outcomes: &[(&str, AnchorSource)],
) -> Vec<FeatureSpec> {
    let mut specs = Vec::with_capacity(exposures.len() * periods.len() * outcomes.len());
    for (exposure_label, exposure) in exposures {
        for (period_label, window) in periods {
            for (outcome_label, anchor) in outcomes {
                specs.push(FeatureSpec::ExposureInWindow {
                    name: format!("{exposure_label}_{period_label}_{outcome_label}"),
                    exposure: Arc::clone(exposure),
                    window: *window,
                    anchor: anchor.clone(),
                });
            }
        }
    }
    specs
}
