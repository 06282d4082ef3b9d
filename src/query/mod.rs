//! Composable event queries
//!
//! A reusable filter/sort/reduce pipeline over one patient's event stream.
//! Queries are plain values over a borrowed slice: building one allocates
//! only the predicate list, and every terminal operation re-walks the
//! stream, so a query can be evaluated more than once.

pub mod date;

pub use date::{DateBounds, DatePredicate};

use smallvec::SmallVec;

use crate::codelist::CodeList;
use crate::models::TimestampedEvent;

/// A filtered view over one patient's event stream
///
/// Terminal operations mirror the per-patient aggregations the pipeline
/// needs: first/last by date, existence, and count. When several events
/// share the boundary date, ingestion order breaks the tie: `first` keeps
/// the earliest-ingested of the earliest-dated events, `last` keeps the
/// latest-ingested of the latest-dated ones.
#[derive(Debug, Clone)]
pub struct EventQuery<'a, E> {
    events: &'a [E],
    code_filter: Option<&'a CodeList>,
    date_filters: SmallVec<[DatePredicate; 2]>,
}

impl<'a, E: TimestampedEvent> EventQuery<'a, E> {
    /// Start a query over a patient's stream
    #[must_use]
    pub fn new(events: &'a [E]) -> Self {
        Self {
            events,
            code_filter: None,
            date_filters: SmallVec::new(),
        }
    }

    /// Keep only events whose code is in the given list
    #[must_use]
    pub fn where_code_in(mut self, codelist: &'a CodeList) -> Self {
        self.code_filter = Some(codelist);
        self
    }

    /// Keep only events whose date satisfies the predicate
    #[must_use]
    pub fn where_date(mut self, predicate: DatePredicate) -> Self {
        self.date_filters.push(predicate);
        self
    }

    /// Keep only events whose date satisfies every set bound
    #[must_use]
    pub fn where_date_in(mut self, bounds: &DateBounds) -> Self {
        self.date_filters.extend(bounds.predicates());
        self
    }

    /// Iterate over the matching events in ingestion order
    pub fn matching(&self) -> impl Iterator<Item = &'a E> + '_ {
        self.events.iter().filter(move |event| {
            if let Some(codelist) = self.code_filter {
                if !codelist.contains(event.code()) {
                    return false;
                }
            }
            self.date_filters
                .iter()
                .all(|predicate| predicate.matches(event.event_date()))
        })
    }

    /// The earliest matching event
    #[must_use]
    pub fn first_for_patient(&self) -> Option<&'a E> {
        let mut first: Option<&'a E> = None;
        for event in self.matching() {
            match first {
                // Strict comparison keeps the earliest-ingested on ties
                Some(current) if event.event_date() >= current.event_date() => {}
                _ => first = Some(event),
            }
        }
        first
    }

    /// The latest matching event
    #[must_use]
    pub fn last_for_patient(&self) -> Option<&'a E> {
        let mut last: Option<&'a E> = None;
        for event in self.matching() {
            match last {
                // Non-strict comparison keeps the latest-ingested on ties
                Some(current) if event.event_date() < current.event_date() => {}
                _ => last = Some(event),
            }
        }
        last
    }

    /// Whether any event matches
    #[must_use]
    pub fn exists_for_patient(&self) -> bool {
        self.matching().next().is_some()
    }

    /// Number of matching events
    #[must_use]
    pub fn count_for_patient(&self) -> usize {
        self.matching().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClinicalEvent, PatientId};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(code: &str, event_date: NaiveDate) -> ClinicalEvent {
        ClinicalEvent::snomed(PatientId(1), code.to_string(), event_date)
    }

    #[test]
    fn first_and_last_break_date_ties_by_ingestion_order() {
        let events = vec![
            event("a", date(2020, 3, 1)),
            event("b", date(2020, 3, 1)),
            event("c", date(2020, 2, 1)),
            event("d", date(2020, 2, 1)),
        ];
        let list = CodeList::new(
            "all",
            ["a", "b", "c", "d"].map(String::from),
        );

        let query = EventQuery::new(&events).where_code_in(&list);
        assert_eq!(query.first_for_patient().unwrap().code, "c");
        assert_eq!(query.last_for_patient().unwrap().code, "b");
    }

    #[test]
    fn queries_are_restartable() {
        let events = vec![event("a", date(2020, 1, 1)), event("a", date(2020, 1, 2))];
        let list = CodeList::new("a", ["a".to_string()]);
        let query = EventQuery::new(&events).where_code_in(&list);

        assert_eq!(query.count_for_patient(), 2);
        assert_eq!(query.count_for_patient(), 2);
        assert!(query.exists_for_patient());
    }
}
