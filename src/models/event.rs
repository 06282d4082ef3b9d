//! Clinical event and medication dispensing models
//!
//! Events are append-only records supplied by the event store. The order in
//! which events were ingested is preserved within each patient's stream and
//! is used as the deterministic tie-break when several events share a date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PatientId;

/// Coding system an event's code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodingSystem {
    /// SNOMED CT concept identifiers (primary care diagnoses and findings)
    SnomedCt,
    /// NHS dictionary of medicines and devices (dm+d) codes
    Dmd,
    /// ICD-10 codes (hospital episodes)
    Icd10,
    /// CTV3 (Read v3) codes
    Ctv3,
}

/// A coded clinical event (diagnosis, finding, observation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalEvent {
    /// Patient the event belongs to
    pub patient_id: PatientId,
    /// Clinical code
    pub code: String,
    /// Coding system of the code
    pub coding_system: CodingSystem,
    /// Date the event was recorded
    pub event_date: NaiveDate,
    /// Associated numeric value, when the event carries one
    pub numeric_value: Option<f64>,
}

impl ClinicalEvent {
    /// Create a SNOMED CT coded event without a numeric value
    #[must_use]
    pub const fn snomed(patient_id: PatientId, code: String, event_date: NaiveDate) -> Self {
        Self {
            patient_id,
            code,
            coding_system: CodingSystem::SnomedCt,
            event_date,
            numeric_value: None,
        }
    }
}

/// A medication dispensing record (dm+d coded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationDispense {
    /// Patient the dispensing belongs to
    pub patient_id: PatientId,
    /// dm+d code of the dispensed product
    pub code: String,
    /// Date of the dispensing
    pub event_date: NaiveDate,
}

impl MedicationDispense {
    /// Create a dispensing record
    #[must_use]
    pub const fn new(patient_id: PatientId, code: String, event_date: NaiveDate) -> Self {
        Self {
            patient_id,
            code,
            event_date,
        }
    }
}

/// Common access to the code and date of a timestamped event
///
/// Both event streams expose the same query surface through this trait, so
/// anchors and windows can be derived from either.
pub trait TimestampedEvent {
    /// The event's code
    fn code(&self) -> &str;
    /// The event's date
    fn event_date(&self) -> NaiveDate;
}

impl TimestampedEvent for ClinicalEvent {
    fn code(&self) -> &str {
        &self.code
    }

    fn event_date(&self) -> NaiveDate {
        self.event_date
    }
}

impl TimestampedEvent for MedicationDispense {
    fn code(&self) -> &str {
        &self.code
    }

    fn event_date(&self) -> NaiveDate {
        self.event_date
    }
}
