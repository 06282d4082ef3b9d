//! Population eligibility rules
//!
//! Eligibility is a conjunction over one patient's streams: presence (or
//! required absence) of a qualifying anchor, continuous registration around
//! a reference date, and absence of disqualifying prior events. A patient
//! failing any part simply yields no output row; nothing here is an error.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::algorithm::anchor::{EventSelection, resolve_event_date};
use crate::codelist::CodeList;
use crate::config::StudyConfig;
use crate::models::PatientData;
use crate::query::{DateBounds, DatePredicate, EventQuery};

/// Whether the population keeps patients with or without an anchor
///
/// Case definitions require a qualifying anchor; potential-control
/// definitions require its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRequirement {
    /// Keep only patients with a resolved anchor date
    Present,
    /// Keep only patients with no resolved anchor date
    Absent,
}

/// Reference date for the registration-coverage check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationReference {
    /// Measure the lead from the patient's anchor date
    Anchor,
    /// Measure the lead from the study start date
    StudyStart,
}

/// Horizon before which a disqualifying event excludes the patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionHorizon {
    /// Any event on or before the study start date disqualifies
    OnOrBeforeStudyStart,
    /// Any event strictly before the patient's anchor disqualifies
    BeforeAnchor,
}

/// How the per-patient anchor date is resolved
#[derive(Debug, Clone)]
pub struct AnchorRule {
    /// Code list qualifying events may match
    pub codelist: Arc<CodeList>,
    /// Date bounds a qualifying event must satisfy
    pub bounds: DateBounds,
    /// Whether the first or last qualifying event supplies the anchor
    pub selection: EventSelection,
}

impl AnchorRule {
    /// The anchor rule used by the study definitions: first qualifying
    /// clinical event strictly after the study start
    #[must_use]
    pub fn first_after(codelist: Arc<CodeList>, study_start: NaiveDate) -> Self {
        Self {
            codelist,
            bounds: DateBounds::unbounded().after(study_start),
            selection: EventSelection::First,
        }
    }

    /// Resolve the anchor for one patient
    #[must_use]
    pub fn resolve(&self, data: &PatientData) -> Option<NaiveDate> {
        resolve_event_date(
            &data.clinical_events,
            &self.codelist,
            &self.bounds,
            self.selection,
        )
    }
}

/// A disqualifying-prior-event rule
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    /// Code list of disqualifying events
    pub codelist: Arc<CodeList>,
    /// Horizon before which a match disqualifies
    pub horizon: ExclusionHorizon,
}

/// The full eligibility predicate for a dataset definition
#[derive(Debug, Clone)]
pub struct EligibilityRule {
    /// Anchor resolution rule
    pub anchor: AnchorRule,
    /// Whether the anchor must be present or absent
    pub anchor_requirement: AnchorRequirement,
    /// Reference date for the registration check
    pub registration_reference: RegistrationReference,
    /// Disqualifying prior-event rules
    pub exclusions: Vec<ExclusionRule>,
}

impl EligibilityRule {
    /// The patient's anchor date under this rule
    #[must_use]
    pub fn anchor_date(&self, data: &PatientData) -> Option<NaiveDate> {
        self.anchor.resolve(data)
    }

    /// Evaluate the full predicate for one patient
    #[must_use]
    pub fn is_eligible(&self, data: &PatientData, config: &StudyConfig) -> bool {
        // Presence of the record itself covers the base-table existence check
        let anchor = self.anchor_date(data);

        match self.anchor_requirement {
            AnchorRequirement::Present if anchor.is_none() => return false,
            AnchorRequirement::Absent if anchor.is_some() => return false,
            _ => {}
        }

        let reference = match self.registration_reference {
            RegistrationReference::Anchor => match anchor {
                Some(date) => date,
                None => return false,
            },
            RegistrationReference::StudyStart => config.study_start,
        };

        // At least one period starting by reference + lead and running to the
        // study end (or still ongoing)
        let Some(lead_end) = config.registration_lead.add_to(reference) else {
            return false;
        };
        let registered = data.registrations.iter().any(|period| {
            period.start_date <= lead_end
                && period.end_date.is_none_or(|end| end >= config.study_end)
        });
        if !registered {
            return false;
        }

        for exclusion in &self.exclusions {
            let excluded = match exclusion.horizon {
                ExclusionHorizon::OnOrBeforeStudyStart => {
                    EventQuery::new(&data.clinical_events)
                        .where_code_in(&exclusion.codelist)
                        .where_date(DatePredicate::OnOrBefore(config.study_start))
                        .exists_for_patient()
                }
                ExclusionHorizon::BeforeAnchor => match anchor {
                    Some(anchor) => EventQuery::new(&data.clinical_events)
                        .where_code_in(&exclusion.codelist)
                        .where_date(DatePredicate::Before(anchor))
                        .exists_for_patient(),
                    None => false,
                },
            };
            if excluded {
                return false;
            }
        }

        true
    }
}
