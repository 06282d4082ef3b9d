//! A Rust library for deriving case-time-control study cohorts and feature
//! tables from timestamped EHR events, with code-list handling, matching
//! and interval measures.

pub mod algorithm;
pub mod codelist;
pub mod config;
pub mod dummy;
pub mod error;
pub mod models;
pub mod output;
pub mod query;
pub mod study;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::StudyConfig;
pub use error::{CohortError, Result};
pub use models::{
    ClinicalEvent, EventStore, FeatureRow, FeatureValue, InMemoryEventStore,
    MedicationDispense, Patient, PatientData, PatientId, RegistrationPeriod, Sex,
};

// Code lists
pub use codelist::{CodeList, CodeListRegistry, CodelistError};

// Derivation core
pub use algorithm::cohort::{CohortAssembler, DatasetDefinition, FeatureSpec};
pub use algorithm::window::{Offset, TimeWindow};
pub use query::{DateBounds, DatePredicate, EventQuery};

// Matching and measures
pub use algorithm::matching::{Matcher, MatchingConfig, MatchingResult};
pub use algorithm::measures::{IntervalPartition, MeasureRow, Measures};
