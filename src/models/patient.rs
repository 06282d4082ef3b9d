//! Patient entity model
//!
//! This module contains the Patient model with the demographic record
//! attached to each individual in the event store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a patient
///
/// Output tables are always ordered by ascending `PatientId` so repeated
/// runs over the same data produce identical files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sex as recorded in the demographic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Female
    Female,
    /// Male
    Male,
    /// Intersex / indeterminate
    Intersex,
    /// Not recorded
    Unknown,
}

impl Sex {
    /// String form used in output tables
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Intersex => "intersex",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Demographic record for a single patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Patient identifier
    pub id: PatientId,
    /// Recorded sex
    pub sex: Sex,
    /// Date of birth, if recorded
    pub date_of_birth: Option<NaiveDate>,
    /// Index of Multiple Deprivation, rounded value
    pub imd_rounded: Option<u32>,
    /// Index of Multiple Deprivation decile (1 = most deprived)
    pub imd_decile: Option<u8>,
}

impl Patient {
    /// Create a patient with only an identifier and sex
    #[must_use]
    pub const fn new(id: PatientId, sex: Sex) -> Self {
        Self {
            id,
            sex,
            date_of_birth: None,
            imd_rounded: None,
            imd_decile: None,
        }
    }

    /// Age in completed years on the given date
    ///
    /// Returns `None` when the date of birth is missing or later than the
    /// reference date.
    #[must_use]
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        date.years_since(dob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_counts_completed_years() {
        let mut patient = Patient::new(PatientId(1), Sex::Female);
        patient.date_of_birth = NaiveDate::from_ymd_opt(1980, 6, 15);

        // Day before the birthday
        let before = NaiveDate::from_ymd_opt(2020, 6, 14).unwrap();
        assert_eq!(patient.age_on(before), Some(39));

        // On the birthday
        let on = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
        assert_eq!(patient.age_on(on), Some(40));
    }

    #[test]
    fn age_is_none_without_birth_date() {
        let patient = Patient::new(PatientId(1), Sex::Male);
        assert_eq!(
            patient.age_on(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            None
        );
    }
}
