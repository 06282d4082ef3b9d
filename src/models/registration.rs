//! Practice registration periods
//!
//! A registration period records the interval during which a patient was
//! registered with a practice. Periods for one patient never overlap; the
//! store validates this on construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PatientId;

/// A single registration period for a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPeriod {
    /// Patient the registration belongs to
    pub patient_id: PatientId,
    /// First day of the registration
    pub start_date: NaiveDate,
    /// Last day of the registration; `None` means the registration is ongoing
    pub end_date: Option<NaiveDate>,
}

impl RegistrationPeriod {
    /// Create a registration period
    #[must_use]
    pub const fn new(
        patient_id: PatientId,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            patient_id,
            start_date,
            end_date,
        }
    }

    /// Whether the period covers the given date
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        if date < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => date <= end,
            None => true,
        }
    }

    /// Whether the period fully spans the inclusive interval `[start, end]`
    #[must_use]
    pub fn spans(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= start
            && match self.end_date {
                Some(period_end) => period_end >= end,
                None => true,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ongoing_period_covers_any_later_date() {
        let period = RegistrationPeriod::new(PatientId(1), date(2015, 1, 1), None);
        assert!(period.covers(date(2015, 1, 1)));
        assert!(period.covers(date(2040, 12, 31)));
        assert!(!period.covers(date(2014, 12, 31)));
    }

    #[test]
    fn closed_period_is_inclusive_at_both_ends() {
        let period =
            RegistrationPeriod::new(PatientId(1), date(2015, 1, 1), Some(date(2016, 1, 1)));
        assert!(period.covers(date(2016, 1, 1)));
        assert!(!period.covers(date(2016, 1, 2)));
        assert!(period.spans(date(2015, 2, 1), date(2015, 12, 1)));
        assert!(!period.spans(date(2015, 2, 1), date(2016, 2, 1)));
    }
}
