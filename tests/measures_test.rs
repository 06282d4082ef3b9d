use chrono::NaiveDate;
use std::sync::Arc;

use ehr_cohort::algorithm::measures::{
    Denominator, EventStream, IntervalPartition, Measure, MeasureQuantity, Measures, Numerator,
};
use ehr_cohort::algorithm::window::{Offset, TimeWindow};
use ehr_cohort::models::{
    ClinicalEvent, MedicationDispense, Patient, PatientId, RegistrationPeriod, Sex,
};
use ehr_cohort::{CodeList, InMemoryEventStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn amoxicillin_codes() -> Arc<CodeList> {
    Arc::new(CodeList::new("amoxicillin", ["100".to_string()]))
}

fn tendinitis_codes() -> Arc<CodeList> {
    Arc::new(CodeList::new("tendinitis", ["900".to_string()]))
}

fn store() -> InMemoryEventStore {
    // Patient 1: registered throughout, two dispensings in January 2011 and
    // a tendinitis diagnosis on 2011-01-20 preceded by a dispensing
    // Patient 2: never registered, with a dispensing that must not count
    let patients = vec![
        Patient::new(PatientId(1), Sex::Female),
        Patient::new(PatientId(2), Sex::Male),
    ];
    let clinical = vec![ClinicalEvent::snomed(
        PatientId(1),
        "900".to_string(),
        date(2011, 1, 20),
    )];
    let dispensings = vec![
        MedicationDispense::new(PatientId(1), "100".to_string(), date(2011, 1, 5)),
        MedicationDispense::new(PatientId(1), "100".to_string(), date(2011, 1, 28)),
        MedicationDispense::new(PatientId(2), "100".to_string(), date(2011, 1, 10)),
    ];
    let registrations = vec![RegistrationPeriod::new(
        PatientId(1),
        date(2005, 1, 1),
        None,
    )];
    InMemoryEventStore::from_records(patients, clinical, dispensings, registrations).unwrap()
}

fn monthly_measures(measure: Measure) -> Measures {
    let partition = IntervalPartition::monthly(date(2010, 12, 1), 3).unwrap();
    let mut measures = Measures::new(partition);
    measures.define_measure(measure);
    measures
}

#[test]
fn counts_are_per_interval_and_limited_to_the_registered() {
    let measures = monthly_measures(Measure {
        name: "amoxicillin_trends".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Medication,
            codelist: amoxicillin_codes(),
            quantity: MeasureQuantity::Count,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    let rows = measures.evaluate(&store()).unwrap();
    assert_eq!(rows.len(), 3);

    // December 2010: no dispensings
    assert_eq!(rows[0].interval_start, date(2010, 12, 1));
    assert_eq!(rows[0].numerator, 0);
    assert_eq!(rows[0].denominator, 1);

    // January 2011: two dispensings for the registered patient; the
    // unregistered patient's dispensing does not count
    assert_eq!(rows[1].interval_start, date(2011, 1, 1));
    assert_eq!(rows[1].numerator, 2);
    assert_eq!(rows[1].denominator, 1);
    assert_eq!(rows[1].ratio, Some(2.0));
}

#[test]
fn existence_numerators_count_each_patient_once() {
    let measures = monthly_measures(Measure {
        name: "tendinitis_trends".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Clinical,
            codelist: tendinitis_codes(),
            quantity: MeasureQuantity::Exists,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    let rows = measures.evaluate(&store()).unwrap();
    assert_eq!(rows[1].numerator, 1);
    assert_eq!(rows[2].numerator, 0);
}

#[test]
fn preceding_exposure_numerator_anchors_on_the_interval_outcome() {
    let measures = monthly_measures(Measure {
        name: "tendinitis_prevamox_trends".to_string(),
        numerator: Numerator::ExposurePrecedingFirstEvent {
            outcome: tendinitis_codes(),
            exposure: amoxicillin_codes(),
            window: TimeWindow::new(Offset::days(30), Offset::days(1)).unwrap(),
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    let rows = measures.evaluate(&store()).unwrap();
    // Diagnosis on 2011-01-20 with a dispensing 15 days earlier
    assert_eq!(rows[1].numerator, 1);
    // No diagnosis in December or February
    assert_eq!(rows[0].numerator, 0);
    assert_eq!(rows[2].numerator, 0);
}

#[test]
fn all_patients_denominator_includes_the_unregistered() {
    let measures = monthly_measures(Measure {
        name: "amoxicillin_all".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Medication,
            codelist: amoxicillin_codes(),
            quantity: MeasureQuantity::Count,
        },
        denominator: Denominator::AllPatients,
    });

    let rows = measures.evaluate(&store()).unwrap();
    assert_eq!(rows[1].numerator, 3);
    assert_eq!(rows[1].denominator, 2);
}

#[test]
fn zero_denominator_yields_no_ratio() {
    let patients = vec![Patient::new(PatientId(1), Sex::Female)];
    let store =
        InMemoryEventStore::from_records(patients, Vec::new(), Vec::new(), Vec::new()).unwrap();

    let measures = monthly_measures(Measure {
        name: "amoxicillin_trends".to_string(),
        numerator: Numerator::EventsInInterval {
            stream: EventStream::Medication,
            codelist: amoxicillin_codes(),
            quantity: MeasureQuantity::Count,
        },
        denominator: Denominator::RegisteredThroughInterval,
    });

    let rows = measures.evaluate(&store).unwrap();
    assert_eq!(rows[0].denominator, 0);
    assert_eq!(rows[0].ratio, None);
}
