//! Interval-based measures
//!
//! A measure re-evaluates a numerator and denominator over every interval
//! of a calendar partition, with no state carried between intervals. Each
//! interval's figures are sums of per-patient quantities over the patients
//! satisfying the denominator in that interval.

pub mod intervals;

pub use intervals::{Interval, IntervalPartition, IntervalWidth};

use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use crate::algorithm::window::TimeWindow;
use crate::codelist::CodeList;
use crate::error::Result;
use crate::models::{EventStore, PatientData, TimestampedEvent};
use crate::query::{DatePredicate, EventQuery};

/// Which event stream a measure reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStream {
    /// Coded clinical events
    Clinical,
    /// Medication dispensings
    Medication,
}

/// Per-patient aggregation for an in-interval numerator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureQuantity {
    /// 1 when any event matches, else 0
    Exists,
    /// Number of matching events
    Count,
}

/// Per-patient, per-interval numerator definition
#[derive(Debug, Clone)]
pub enum Numerator {
    /// Events coded in a list whose date falls in the interval
    EventsInInterval {
        /// Stream the events come from
        stream: EventStream,
        /// Code list qualifying events may match
        codelist: Arc<CodeList>,
        /// How the matches aggregate per patient
        quantity: MeasureQuantity,
    },
    /// A dispensing in the window before the interval's first outcome event
    ///
    /// The anchor is the first event coded in `outcome` within the
    /// interval; patients without one contribute 0.
    ExposurePrecedingFirstEvent {
        /// Outcome code list supplying the per-interval anchor
        outcome: Arc<CodeList>,
        /// Exposure code list the dispensing must match
        exposure: Arc<CodeList>,
        /// Lookback window before the anchor
        window: TimeWindow,
    },
}

/// Per-patient, per-interval denominator definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denominator {
    /// 1 when a registration period spans the whole interval
    RegisteredThroughInterval,
    /// Every patient contributes 1
    AllPatients,
}

/// A named measure
#[derive(Debug, Clone)]
pub struct Measure {
    /// Measure name, used in the output rows
    pub name: String,
    /// Numerator definition
    pub numerator: Numerator,
    /// Denominator definition
    pub denominator: Denominator,
}

/// One output row of a measures run
#[derive(Debug, Clone, Serialize)]
pub struct MeasureRow {
    /// Measure the row belongs to
    pub measure: String,
    /// First day of the interval
    pub interval_start: NaiveDate,
    /// Last day of the interval
    pub interval_end: NaiveDate,
    /// Summed numerator over the denominator population
    pub numerator: u64,
    /// Summed denominator
    pub denominator: u64,
    /// `numerator / denominator`, absent when the denominator is zero
    pub ratio: Option<f64>,
}

/// A set of measures evaluated over one interval partition
#[derive(Debug)]
pub struct Measures {
    partition: IntervalPartition,
    measures: Vec<Measure>,
}

impl Measures {
    /// Create an empty measure set over the given partition
    #[must_use]
    pub const fn new(partition: IntervalPartition) -> Self {
        Self {
            partition,
            measures: Vec::new(),
        }
    }

    /// Add a measure
    pub fn define_measure(&mut self, measure: Measure) {
        self.measures.push(measure);
    }

    /// Evaluate every measure over every interval
    ///
    /// Intervals are independent, so each measure fans out across the rayon
    /// pool; rows come back ordered by measure then interval.
    pub fn evaluate(&self, store: &dyn EventStore) -> Result<Vec<MeasureRow>> {
        let patients = store.patients();
        info!(
            "Evaluating {} measures over {} intervals and {} patients",
            self.measures.len(),
            self.partition.len(),
            patients.len()
        );

        let mut rows = Vec::with_capacity(self.measures.len() * self.partition.len());
        for measure in &self.measures {
            let mut measure_rows: Vec<MeasureRow> = self
                .partition
                .intervals()
                .par_iter()
                .map(|interval| evaluate_interval(measure, *interval, patients))
                .collect();
            rows.append(&mut measure_rows);
        }
        Ok(rows)
    }
}

fn evaluate_interval(measure: &Measure, interval: Interval, patients: &[PatientData]) -> MeasureRow {
    let mut numerator = 0u64;
    let mut denominator = 0u64;

    for data in patients {
        let in_denominator = match measure.denominator {
            Denominator::RegisteredThroughInterval => data
                .registrations
                .iter()
                .any(|period| period.spans(interval.start, interval.end)),
            Denominator::AllPatients => true,
        };
        if !in_denominator {
            continue;
        }
        denominator += 1;
        numerator += numerator_value(&measure.numerator, interval, data);
    }

    MeasureRow {
        measure: measure.name.clone(),
        interval_start: interval.start,
        interval_end: interval.end,
        numerator,
        denominator,
        ratio: if denominator == 0 {
            None
        } else {
            Some(numerator as f64 / denominator as f64)
        },
    }
}

fn numerator_value(numerator: &Numerator, interval: Interval, data: &PatientData) -> u64 {
    match numerator {
        Numerator::EventsInInterval {
            stream,
            codelist,
            quantity,
        } => match stream {
            EventStream::Clinical => {
                aggregate_in_interval(&data.clinical_events, codelist, interval, *quantity)
            }
            EventStream::Medication => {
                aggregate_in_interval(&data.dispensings, codelist, interval, *quantity)
            }
        },
        Numerator::ExposurePrecedingFirstEvent {
            outcome,
            exposure,
            window,
        } => {
            let anchor = EventQuery::new(&data.clinical_events)
                .where_code_in(outcome)
                .where_date(DatePredicate::OnOrBetween(interval.start, interval.end))
                .first_for_patient()
                .map(TimestampedEvent::event_date);
            u64::from(crate::algorithm::window::exposed_in_window(
                &data.dispensings,
                exposure,
                anchor,
                window,
            ))
        }
    }
}

fn aggregate_in_interval<E: TimestampedEvent>(
    events: &[E],
    codelist: &CodeList,
    interval: Interval,
    quantity: MeasureQuantity,
) -> u64 {
    let query = EventQuery::new(events)
        .where_code_in(codelist)
        .where_date(DatePredicate::OnOrBetween(interval.start, interval.end));
    match quantity {
        MeasureQuantity::Exists => u64::from(query.exists_for_patient()),
        MeasureQuantity::Count => query.count_for_patient() as u64,
    }
}
