//! Index date resolution
//!
//! An index (anchor) date is the per-patient reference date from which all
//! time windows are measured: typically the first qualifying diagnosis or
//! prescription. Resolution is a pure function of the patient's stream and
//! the configured code list and bounds, so re-running it always yields the
//! same date.

use chrono::NaiveDate;

use crate::codelist::CodeList;
use crate::models::TimestampedEvent;
use crate::query::{DateBounds, EventQuery};

/// Which end of the ordered event set supplies the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSelection {
    /// Earliest matching event
    First,
    /// Latest matching event
    Last,
}

/// Date of the earliest event coded in `codelist` within `bounds`
///
/// `None` when no event matches; ties on the boundary date resolve to the
/// earliest-ingested event, which carries the same date.
#[must_use]
pub fn first_event_date<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    bounds: &DateBounds,
) -> Option<NaiveDate> {
    EventQuery::new(events)
        .where_code_in(codelist)
        .where_date_in(bounds)
        .first_for_patient()
        .map(TimestampedEvent::event_date)
}

/// Date of the latest event coded in `codelist` within `bounds`
#[must_use]
pub fn last_event_date<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    bounds: &DateBounds,
) -> Option<NaiveDate> {
    EventQuery::new(events)
        .where_code_in(codelist)
        .where_date_in(bounds)
        .last_for_patient()
        .map(TimestampedEvent::event_date)
}

/// Resolve an anchor date using the given selection rule
#[must_use]
pub fn resolve_event_date<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    bounds: &DateBounds,
    selection: EventSelection,
) -> Option<NaiveDate> {
    match selection {
        EventSelection::First => first_event_date(events, codelist, bounds),
        EventSelection::Last => last_event_date(events, codelist, bounds),
    }
}
