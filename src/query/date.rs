//! Date comparison predicates
//!
//! Inclusive/exclusive semantics are load-bearing for window derivation and
//! are preserved exactly: `After` is strictly greater, `OnOrBefore` is
//! less-or-equal, and `OnOrBetween` includes both endpoints.

use chrono::NaiveDate;

/// A single comparison against an event date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePredicate {
    /// Strictly after the given date
    After(NaiveDate),
    /// On or after the given date
    OnOrAfter(NaiveDate),
    /// Strictly before the given date
    Before(NaiveDate),
    /// On or before the given date
    OnOrBefore(NaiveDate),
    /// Between the two dates, inclusive at both ends
    OnOrBetween(NaiveDate, NaiveDate),
}

impl DatePredicate {
    /// Whether the given date satisfies the predicate
    #[must_use]
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::After(bound) => date > *bound,
            Self::OnOrAfter(bound) => date >= *bound,
            Self::Before(bound) => date < *bound,
            Self::OnOrBefore(bound) => date <= *bound,
            Self::OnOrBetween(start, end) => date >= *start && date <= *end,
        }
    }
}

/// Optional lower and upper bounds on an event date
///
/// Each bound keeps its own inclusivity; unset bounds match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    after: Option<NaiveDate>,
    on_or_after: Option<NaiveDate>,
    before: Option<NaiveDate>,
    on_or_before: Option<NaiveDate>,
}

impl DateBounds {
    /// Bounds that match every date
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            after: None,
            on_or_after: None,
            before: None,
            on_or_before: None,
        }
    }

    /// Require dates strictly after the given date
    #[must_use]
    pub const fn after(mut self, date: NaiveDate) -> Self {
        self.after = Some(date);
        self
    }

    /// Require dates on or after the given date
    #[must_use]
    pub const fn on_or_after(mut self, date: NaiveDate) -> Self {
        self.on_or_after = Some(date);
        self
    }

    /// Require dates strictly before the given date
    #[must_use]
    pub const fn before(mut self, date: NaiveDate) -> Self {
        self.before = Some(date);
        self
    }

    /// Require dates on or before the given date
    #[must_use]
    pub const fn on_or_before(mut self, date: NaiveDate) -> Self {
        self.on_or_before = Some(date);
        self
    }

    /// Whether a date satisfies every set bound
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.predicates().all(|predicate| predicate.matches(date))
    }

    /// The set bounds as individual predicates
    pub fn predicates(&self) -> impl Iterator<Item = DatePredicate> {
        [
            self.after.map(DatePredicate::After),
            self.on_or_after.map(DatePredicate::OnOrAfter),
            self.before.map(DatePredicate::Before),
            self.on_or_before.map(DatePredicate::OnOrBefore),
        ]
        .into_iter()
        .flatten()
    }
}
