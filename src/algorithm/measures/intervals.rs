//! Calendar interval partitions
//!
//! A partition splits a span of calendar time into consecutive fixed-width
//! intervals, inclusive at both ends, with no gap between one interval's
//! end and the next one's start.

use chrono::{Days, Months, NaiveDate};

use crate::error::{CohortError, Result};

/// One calendar interval, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// First day of the interval
    pub start: NaiveDate,
    /// Last day of the interval
    pub end: NaiveDate,
}

impl Interval {
    /// Whether the interval contains the given date
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Width of each interval in a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalWidth {
    /// Calendar months
    Months(u32),
    /// Whole weeks
    Weeks(u32),
}

/// A consecutive sequence of fixed-width intervals
#[derive(Debug, Clone)]
pub struct IntervalPartition {
    intervals: Vec<Interval>,
}

impl IntervalPartition {
    /// Partition starting on `start` into `count` intervals of `width`
    ///
    /// Fails when the count or width is zero, or the span runs off the
    /// calendar.
    pub fn new(start: NaiveDate, width: IntervalWidth, count: u32) -> Result<Self> {
        if count == 0 {
            return Err(CohortError::configuration(
                "interval partition needs at least one interval",
            ));
        }
        match width {
            IntervalWidth::Months(0) | IntervalWidth::Weeks(0) => {
                return Err(CohortError::configuration(
                    "interval width must be positive",
                ));
            }
            _ => {}
        }

        let mut intervals = Vec::with_capacity(count as usize);
        let mut interval_start = start;
        for index in 1..=count {
            let next_start = match width {
                IntervalWidth::Months(months) => {
                    start.checked_add_months(Months::new(index * months))
                }
                IntervalWidth::Weeks(weeks) => {
                    start.checked_add_days(Days::new(u64::from(index * weeks) * 7))
                }
            }
            .ok_or_else(|| {
                CohortError::configuration(format!(
                    "interval partition starting {start} runs off the calendar"
                ))
            })?;
            let end = next_start.pred_opt().ok_or_else(|| {
                CohortError::configuration(format!(
                    "interval partition starting {start} runs off the calendar"
                ))
            })?;
            intervals.push(Interval {
                start: interval_start,
                end,
            });
            interval_start = next_start;
        }
        Ok(Self { intervals })
    }

    /// `count` one-month intervals starting on `start`
    pub fn monthly(start: NaiveDate, count: u32) -> Result<Self> {
        Self::new(start, IntervalWidth::Months(1), count)
    }

    /// `count` one-week intervals starting on `start`
    pub fn weekly(start: NaiveDate, count: u32) -> Result<Self> {
        Self::new(start, IntervalWidth::Weeks(1), count)
    }

    /// The intervals in order
    #[must_use]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the partition is empty (never true for a constructed value)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
