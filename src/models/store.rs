//! Event store boundary and in-memory implementation
//!
//! The derivation pipeline consumes patient event streams through the
//! `EventStore` trait; any storage engine able to hand over one patient's
//! streams at a time is a valid collaborator. The in-memory implementation
//! backs the dummy-data pipeline and the tests.

use rustc_hash::FxHashMap;

use crate::error::{CohortError, Result};
use crate::models::{
    ClinicalEvent, MedicationDispense, Patient, PatientId, RegistrationPeriod,
};

/// All recorded data for one patient: the unit of parallel work
///
/// Event vectors preserve ingestion order, which serves as the tie-break
/// when several events share a date.
#[derive(Debug, Clone)]
pub struct PatientData {
    /// Demographic record
    pub patient: Patient,
    /// Coded clinical events, in ingestion order
    pub clinical_events: Vec<ClinicalEvent>,
    /// Medication dispensings, in ingestion order
    pub dispensings: Vec<MedicationDispense>,
    /// Registration periods
    pub registrations: Vec<RegistrationPeriod>,
}

impl PatientData {
    /// Create a record with no events
    #[must_use]
    pub const fn new(patient: Patient) -> Self {
        Self {
            patient,
            clinical_events: Vec::new(),
            dispensings: Vec::new(),
            registrations: Vec::new(),
        }
    }

    /// The patient's identifier
    #[must_use]
    pub const fn id(&self) -> PatientId {
        self.patient.id
    }
}

/// Read-only source of per-patient event data
///
/// Implementations must return patients in ascending identifier order.
pub trait EventStore: Sync {
    /// All patients known to the store
    fn patients(&self) -> &[PatientData];

    /// Number of patients in the store
    fn patient_count(&self) -> usize {
        self.patients().len()
    }
}

/// Event store holding all patient data in memory
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    patients: Vec<PatientData>,
}

impl InMemoryEventStore {
    /// Build a store from separate record streams
    ///
    /// Events are grouped per patient, preserving their order within each
    /// stream. Fails with a `DataAccessError` if a patient has overlapping
    /// registration periods, or if an event references an unknown patient.
    pub fn from_records(
        patients: Vec<Patient>,
        clinical_events: Vec<ClinicalEvent>,
        dispensings: Vec<MedicationDispense>,
        registrations: Vec<RegistrationPeriod>,
    ) -> Result<Self> {
        let mut by_id: FxHashMap<PatientId, PatientData> = FxHashMap::default();
        for patient in patients {
            let id = patient.id;
            if by_id.insert(id, PatientData::new(patient)).is_some() {
                return Err(CohortError::data_access(format!(
                    "duplicate patient record for id {id}"
                )));
            }
        }

        for event in clinical_events {
            let data = by_id.get_mut(&event.patient_id).ok_or_else(|| {
                CohortError::data_access(format!(
                    "clinical event references unknown patient {}",
                    event.patient_id
                ))
            })?;
            data.clinical_events.push(event);
        }

        for dispensing in dispensings {
            let data = by_id.get_mut(&dispensing.patient_id).ok_or_else(|| {
                CohortError::data_access(format!(
                    "dispensing references unknown patient {}",
                    dispensing.patient_id
                ))
            })?;
            data.dispensings.push(dispensing);
        }

        for registration in registrations {
            let data = by_id.get_mut(&registration.patient_id).ok_or_else(|| {
                CohortError::data_access(format!(
                    "registration references unknown patient {}",
                    registration.patient_id
                ))
            })?;
            data.registrations.push(registration);
        }

        let mut patients: Vec<PatientData> = by_id.into_values().collect();
        patients.sort_by_key(PatientData::id);

        for data in &mut patients {
            validate_registrations(data)?;
        }

        Ok(Self { patients })
    }

    /// Build a store directly from assembled patient data
    ///
    /// Sorts by patient id and applies the same registration validation as
    /// `from_records`.
    pub fn from_patient_data(mut patients: Vec<PatientData>) -> Result<Self> {
        patients.sort_by_key(PatientData::id);
        for data in &patients {
            validate_registrations(data)?;
        }
        Ok(Self { patients })
    }
}

impl EventStore for InMemoryEventStore {
    fn patients(&self) -> &[PatientData] {
        &self.patients
    }
}

/// Check that a patient's registration periods do not overlap
fn validate_registrations(data: &PatientData) -> Result<()> {
    let mut periods: Vec<&RegistrationPeriod> = data.registrations.iter().collect();
    periods.sort_by_key(|p| p.start_date);

    for pair in periods.windows(2) {
        let overlaps = match pair[0].end_date {
            // An ongoing period overlaps every later one
            None => true,
            Some(end) => end >= pair[1].start_date,
        };
        if overlaps {
            return Err(CohortError::data_access(format!(
                "overlapping registration periods for patient {}",
                data.id()
            )));
        }
    }
    Ok(())
}
