//! Study configuration
//!
//! One immutable configuration value is constructed at startup and passed by
//! reference into every component; nothing in the pipeline mutates it after
//! that.

use chrono::NaiveDate;
use std::fmt;

use crate::algorithm::window::Offset;
use crate::error::{CohortError, Result};

/// Fixed study-level parameters
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// First day of the study period; anchors must fall strictly after it
    pub study_start: NaiveDate,
    /// Last day of the study period
    pub study_end: NaiveDate,
    /// Registration lead required around the anchor for eligibility
    pub registration_lead: Offset,
    /// Number of patients to generate when running on dummy data
    pub dummy_population_size: usize,
    /// Seed for dummy-data generation and matching tie-breaks
    pub random_seed: Option<u64>,
}

impl StudyConfig {
    /// Create a configuration for the given study period
    pub fn new(study_start: NaiveDate, study_end: NaiveDate) -> Result<Self> {
        if study_end <= study_start {
            return Err(CohortError::configuration(format!(
                "study end {study_end} must fall after study start {study_start}"
            )));
        }
        Ok(Self {
            study_start,
            study_end,
            ..Self::default()
        })
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            study_start: NaiveDate::from_ymd_opt(2010, 12, 1).unwrap(),
            study_end: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            registration_lead: Offset::years(1),
            dummy_population_size: 1000,
            random_seed: None,
        }
    }
}

impl fmt::Display for StudyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Study Configuration:")?;
        writeln!(f, "  Study Start: {}", self.study_start)?;
        writeln!(f, "  Study End: {}", self.study_end)?;
        writeln!(f, "  Registration Lead: {}", self.registration_lead)?;
        writeln!(
            f,
            "  Dummy Population Size: {}",
            self.dummy_population_size
        )?;
        if let Some(seed) = self.random_seed {
            writeln!(f, "  Random Seed: {seed}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_period_must_run_forwards() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

        assert!(StudyConfig::new(start, end).is_ok());
        assert!(matches!(
            StudyConfig::new(end, start),
            Err(CohortError::ConfigurationError(_))
        ));
        assert!(StudyConfig::new(start, start).is_err());
    }
}
