//! Categorical covariate derivation
//!
//! A categorical covariate (smoking status, ethnicity) is the category of
//! the most recent mapped event on or before the anchor. One designated
//! category may be marked as a "never" status: it is assigned only when no
//! event in scope maps to any other category, so a patient with both a
//! never-coded event and an earlier or later other-coded event never comes
//! out as "never".

use chrono::NaiveDate;

use crate::codelist::CodeList;
use crate::models::TimestampedEvent;
use crate::query::{DateBounds, EventQuery};

/// Derive the category for one patient
///
/// Events without a category mapping in the list are ignored. Returns
/// `None` when the anchor is missing or no mapped event falls on or before
/// it.
#[must_use]
pub fn derive_category<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    anchor: Option<NaiveDate>,
    never_category: Option<&str>,
) -> Option<String> {
    let anchor = anchor?;
    let bounds = DateBounds::unbounded().on_or_before(anchor);
    let query = EventQuery::new(events)
        .where_code_in(codelist)
        .where_date_in(&bounds);

    let latest = last_mapped_category(&query, codelist, None)?;
    if let Some(never) = never_category {
        if latest == never {
            // "never" stands only when no event maps elsewhere
            if let Some(other) = last_mapped_category(&query, codelist, Some(never)) {
                return Some(other.to_string());
            }
        }
    }
    Some(latest.to_string())
}

/// Category of the latest mapped event, optionally skipping one category
///
/// Ties on the date resolve to the latest-ingested event, matching the
/// last-event selection rule used everywhere else.
fn last_mapped_category<'a, E: TimestampedEvent>(
    query: &EventQuery<'a, E>,
    codelist: &'a CodeList,
    skip: Option<&str>,
) -> Option<&'a str> {
    let mut last: Option<(NaiveDate, &'a str)> = None;
    for event in query.matching() {
        let Some(category) = codelist.category_of(event.code()) else {
            continue;
        };
        if skip == Some(category) {
            continue;
        }
        match last {
            Some((current_date, _)) if event.event_date() < current_date => {}
            _ => last = Some((event.event_date(), category)),
        }
    }
    last.map(|(_, category)| category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClinicalEvent, PatientId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(code: &str, event_date: NaiveDate) -> ClinicalEvent {
        ClinicalEvent::snomed(PatientId(1), code.to_string(), event_date)
    }

    fn smoking_codelist() -> CodeList {
        CodeList::with_categories(
            "smoking",
            vec![
                ("current".to_string(), Some("S".to_string())),
                ("ex".to_string(), Some("E".to_string())),
                ("never".to_string(), Some("N".to_string())),
            ],
        )
        .unwrap()
    }

    #[test]
    fn latest_mapped_event_wins() {
        let list = smoking_codelist();
        let events = vec![
            event("never", date(2015, 1, 1)),
            event("current", date(2018, 1, 1)),
        ];
        let category =
            derive_category(&events, &list, Some(date(2020, 1, 1)), Some("N"));
        assert_eq!(category.as_deref(), Some("S"));
    }

    #[test]
    fn never_yields_to_any_other_mapped_event() {
        let list = smoking_codelist();
        // The never-coded event is the most recent one
        let events = vec![
            event("ex", date(2014, 1, 1)),
            event("never", date(2019, 1, 1)),
        ];
        let category =
            derive_category(&events, &list, Some(date(2020, 1, 1)), Some("N"));
        assert_eq!(category.as_deref(), Some("E"));
    }

    #[test]
    fn never_stands_alone() {
        let list = smoking_codelist();
        let events = vec![event("never", date(2019, 1, 1))];
        let category =
            derive_category(&events, &list, Some(date(2020, 1, 1)), Some("N"));
        assert_eq!(category.as_deref(), Some("N"));
    }

    #[test]
    fn missing_anchor_yields_no_category() {
        let list = smoking_codelist();
        let events = vec![event("current", date(2018, 1, 1))];
        assert_eq!(derive_category(&events, &list, None, Some("N")), None);
    }

    #[test]
    fn events_after_anchor_are_out_of_scope() {
        let list = smoking_codelist();
        let events = vec![
            event("never", date(2015, 1, 1)),
            event("current", date(2021, 6, 1)),
        ];
        let category =
            derive_category(&events, &list, Some(date(2020, 1, 1)), Some("N"));
        assert_eq!(category.as_deref(), Some("N"));
    }
}
