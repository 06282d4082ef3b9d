//! Offset durations and anchored time windows
//!
//! Windows are measured backwards from a per-patient anchor date:
//! `[anchor - start_offset, anchor - end_offset]`, inclusive at both ends.
//! Month and year arithmetic is calendar-aware with month-end clamping
//! (2023-03-31 minus one month is 2023-02-28), the same convention chrono's
//! checked month arithmetic implements.

use chrono::{Days, Months, NaiveDate};
use std::fmt;

use crate::codelist::CodeList;
use crate::error::{CohortError, Result};
use crate::models::TimestampedEvent;
use crate::query::{DatePredicate, EventQuery};

/// A non-negative calendar duration
///
/// Day and week offsets are exact; month and year offsets follow the
/// calendar, clamping to the last valid day of the target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    months: u32,
    days: u64,
}

impl Offset {
    /// An offset of whole days
    #[must_use]
    pub const fn days(days: u64) -> Self {
        Self { months: 0, days }
    }

    /// An offset of whole weeks
    #[must_use]
    pub const fn weeks(weeks: u64) -> Self {
        Self {
            months: 0,
            days: weeks * 7,
        }
    }

    /// An offset of calendar months
    #[must_use]
    pub const fn months(months: u32) -> Self {
        Self { months, days: 0 }
    }

    /// An offset of calendar years
    #[must_use]
    pub const fn years(years: u32) -> Self {
        Self {
            months: years * 12,
            days: 0,
        }
    }

    /// The date this offset before the given date
    ///
    /// `None` only when the result would fall outside the representable
    /// date range.
    #[must_use]
    pub fn subtract_from(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_sub_months(Months::new(self.months))?
            .checked_sub_days(Days::new(self.days))
    }

    /// The date this offset after the given date
    #[must_use]
    pub fn add_to(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(self.months))?
            .checked_add_days(Days::new(self.days))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.months, self.days) {
            (0, d) => write!(f, "{d}d"),
            (m, 0) => write!(f, "{m}m"),
            (m, d) => write!(f, "{m}m{d}d"),
        }
    }
}

/// An anchored lookback window with inclusive bounds
///
/// The start offset must place the lower bound at or before the upper
/// bound; this ordering is validated when the window is constructed, so
/// evaluation over patient data never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start_offset: Offset,
    end_offset: Offset,
}

impl TimeWindow {
    /// Create a window from (start, end) offsets before the anchor
    ///
    /// Fails with a configuration error when the start offset is shorter
    /// than the end offset. Because mixed-unit offsets have no total order,
    /// the comparison is made by applying both offsets to a fixed probe
    /// date.
    pub fn new(start_offset: Offset, end_offset: Offset) -> Result<Self> {
        let probe = NaiveDate::from_ymd_opt(2000, 7, 15)
            .ok_or_else(|| CohortError::configuration("invalid probe date"))?;
        let lower = start_offset.subtract_from(probe);
        let upper = end_offset.subtract_from(probe);
        match (lower, upper) {
            (Some(lower), Some(upper)) if lower <= upper => Ok(Self {
                start_offset,
                end_offset,
            }),
            _ => Err(CohortError::configuration(format!(
                "window start offset {start_offset} must not be shorter than end offset {end_offset}"
            ))),
        }
    }

    /// The inclusive `[lower, upper]` bounds for a given anchor
    #[must_use]
    pub fn bounds(&self, anchor: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let lower = self.start_offset.subtract_from(anchor)?;
        let upper = self.end_offset.subtract_from(anchor)?;
        Some((lower, upper))
    }

    /// Whether a date falls inside the window anchored at `anchor`
    ///
    /// A missing anchor means nothing is in the window.
    #[must_use]
    pub fn contains(&self, anchor: Option<NaiveDate>, date: NaiveDate) -> bool {
        let Some(anchor) = anchor else {
            return false;
        };
        match self.bounds(anchor) {
            Some((lower, upper)) => date >= lower && date <= upper,
            None => false,
        }
    }
}

/// Whether any event coded in `codelist` falls in the window before `anchor`
///
/// Never fails: a missing anchor yields `false`.
#[must_use]
pub fn exposed_in_window<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    anchor: Option<NaiveDate>,
    window: &TimeWindow,
) -> bool {
    window_query(events, codelist, anchor, window)
        .is_some_and(|query| query.exists_for_patient())
}

/// Number of events coded in `codelist` in the window before `anchor`
///
/// Never fails: a missing anchor yields `0`.
#[must_use]
pub fn count_in_window<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    anchor: Option<NaiveDate>,
    window: &TimeWindow,
) -> usize {
    window_query(events, codelist, anchor, window)
        .map_or(0, |query| query.count_for_patient())
}

fn window_query<'a, E: TimestampedEvent>(
    events: &'a [E],
    codelist: &'a CodeList,
    anchor: Option<NaiveDate>,
    window: &TimeWindow,
) -> Option<EventQuery<'a, E>> {
    let anchor = anchor?;
    let (lower, upper) = window.bounds(anchor)?;
    Some(
        EventQuery::new(events)
            .where_code_in(codelist)
            .where_date(DatePredicate::OnOrBetween(lower, upper)),
    )
}
