//! Domain models for the cohort derivation pipeline
//!
//! This module contains the core entity models: patients and their
//! demographic records, the two timestamped event streams, registration
//! periods, and the derived feature rows emitted for eligible patients.

pub mod event;
pub mod feature;
pub mod patient;
pub mod registration;
pub mod store;

// Re-export commonly used types
pub use event::{ClinicalEvent, CodingSystem, MedicationDispense, TimestampedEvent};
pub use feature::{FeatureRow, FeatureValue};
pub use patient::{Patient, PatientId, Sex};
pub use registration::RegistrationPeriod;
pub use store::{EventStore, InMemoryEventStore, PatientData};
