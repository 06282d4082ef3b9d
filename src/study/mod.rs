//! Concrete definitions for the antibiotic safety study
//!
//! These modules assemble the engine's building blocks into the study's
//! actual datasets and measures: combined cases, a tendinitis-only variant,
//! potential controls, and monthly prescribing/incidence trends.

pub mod cases;
pub mod codelists;
pub mod controls;
pub mod measures;
pub mod tendinitis;

pub use cases::case_dataset;
pub use codelists::load_study_codelists;
pub use controls::potential_control_dataset;
pub use measures::trend_measures;
pub use tendinitis::tendinitis_dataset;
