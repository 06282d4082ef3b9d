//! Dummy data generation
//!
//! Generates a synthetic population for pipeline runs without real data.
//! Codes are drawn from the loaded study code lists so the generated events
//! actually match the definitions, and a fraction of fluoroquinolone
//! dispensings are followed by a tendinitis diagnosis so the derived tables
//! are not empty. Generation is deterministic for a fixed seed.

use chrono::{Days, NaiveDate};
use itertools::Itertools;
use log::info;
use rand::prelude::*;

use crate::codelist::CodeListRegistry;
use crate::config::StudyConfig;
use crate::error::Result;
use crate::models::{
    ClinicalEvent, InMemoryEventStore, MedicationDispense, Patient, PatientId,
    RegistrationPeriod, Sex,
};
use crate::study::codelists::{ANTIBIOTIC_KEYS, keys};

/// Seed used when the configuration does not set one
const DEFAULT_SEED: u64 = 20_101_201;

/// Fraction of fluoroquinolone dispensings followed by a tendinitis event
const SIGNAL_PROBABILITY: f64 = 0.10;

/// Generator for synthetic patient populations
#[derive(Debug)]
pub struct DummyDataGenerator<'a> {
    config: &'a StudyConfig,
    registry: &'a CodeListRegistry,
}

impl<'a> DummyDataGenerator<'a> {
    /// Create a generator over the study's code lists
    #[must_use]
    pub const fn new(config: &'a StudyConfig, registry: &'a CodeListRegistry) -> Self {
        Self { config, registry }
    }

    /// Generate a population of `dummy_population_size` patients
    pub fn generate(&self) -> Result<InMemoryEventStore> {
        let seed = self.config.random_seed.unwrap_or(DEFAULT_SEED);
        let mut rng = StdRng::seed_from_u64(seed);

        let antibiotic_codes: Vec<Vec<String>> = ANTIBIOTIC_KEYS
            .iter()
            .map(|key| sorted_codes(self.registry, key))
            .collect::<Result<_>>()?;
        let fluoroquinolone_codes = sorted_codes(self.registry, keys::FLUOROQUINOLONES)?;
        let tendinitis_codes = sorted_codes(self.registry, keys::TENDINITIS)?;
        let neuropathy_codes = sorted_codes(self.registry, keys::PERIPHERAL_NEUROPATHY)?;
        let smoking_codes = sorted_codes(self.registry, keys::SMOKING)?;
        let ethnicity_codes = sorted_codes(self.registry, keys::ETHNICITY)?;

        let study_start = self.config.study_start;
        let study_end = self.config.study_end;

        let mut patients = Vec::with_capacity(self.config.dummy_population_size);
        let mut clinical_events = Vec::new();
        let mut dispensings = Vec::new();
        let mut registrations = Vec::new();

        for index in 0..self.config.dummy_population_size {
            let id = PatientId(index as u64 + 1);

            let sex = match rng.random_range(0..100u32) {
                0..=48 => Sex::Female,
                49..=97 => Sex::Male,
                _ => Sex::Intersex,
            };
            let mut patient = Patient::new(id, sex);
            patient.date_of_birth = Some(random_date(
                &mut rng,
                date(1935, 1, 1),
                date(2005, 12, 31),
            ));
            if rng.random_bool(0.7) {
                let rounded = rng.random_range(0..=328u32) * 100;
                patient.imd_rounded = Some(rounded);
                patient.imd_decile = Some((rounded * 10 / 32_845 + 1).min(10) as u8);
            }
            patients.push(patient);

            // Registration history: mostly a single ongoing period from well
            // before the study, with a minority of closed or late starters
            let history = rng.random_range(0..100u32);
            if history < 85 {
                let start = random_date(&mut rng, date(1990, 1, 1), date(2009, 12, 31));
                registrations.push(RegistrationPeriod::new(id, start, None));
            } else if history < 95 {
                let start = random_date(&mut rng, date(1990, 1, 1), date(2009, 12, 31));
                let end = random_date(&mut rng, date(2012, 1, 1), date(2023, 12, 31));
                registrations.push(RegistrationPeriod::new(id, start, Some(end)));
            } else {
                let start = random_date(&mut rng, date(2015, 1, 1), date(2022, 12, 31));
                registrations.push(RegistrationPeriod::new(id, start, None));
            }

            // Antibiotic dispensings across the study period
            let dispensing_count = rng.random_range(0..=9usize);
            for _ in 0..dispensing_count {
                let list = &antibiotic_codes[weighted_antibiotic_index(&mut rng)];
                let code = pick(&mut rng, list);
                let dispensed = random_date(&mut rng, study_start, study_end);
                let is_fluoroquinolone = fluoroquinolone_codes.binary_search(&code).is_ok();
                dispensings.push(MedicationDispense::new(id, code, dispensed));

                // Occasional tendinitis shortly after a fluoroquinolone
                if is_fluoroquinolone && rng.random_bool(SIGNAL_PROBABILITY) {
                    let lag = rng.random_range(2..=40u64);
                    if let Some(onset) = dispensed.checked_add_days(Days::new(lag)) {
                        clinical_events.push(ClinicalEvent::snomed(
                            id,
                            pick(&mut rng, &tendinitis_codes),
                            onset,
                        ));
                    }
                }
            }

            // Background outcome incidence unrelated to exposure
            if rng.random_bool(0.03) {
                clinical_events.push(ClinicalEvent::snomed(
                    id,
                    pick(&mut rng, &tendinitis_codes),
                    random_date(&mut rng, study_start, study_end),
                ));
            }
            if rng.random_bool(0.02) {
                clinical_events.push(ClinicalEvent::snomed(
                    id,
                    pick(&mut rng, &neuropathy_codes),
                    random_date(&mut rng, study_start, study_end),
                ));
            }
            // A few patients with a pre-existing outcome diagnosis
            if rng.random_bool(0.015) {
                clinical_events.push(ClinicalEvent::snomed(
                    id,
                    pick(&mut rng, &tendinitis_codes),
                    random_date(&mut rng, date(2005, 1, 1), study_start),
                ));
            }

            // Covariate recording
            if rng.random_bool(0.7) {
                for _ in 0..rng.random_range(1..=3u32) {
                    clinical_events.push(ClinicalEvent::snomed(
                        id,
                        pick(&mut rng, &smoking_codes),
                        random_date(&mut rng, date(2000, 1, 1), study_end),
                    ));
                }
            }
            if rng.random_bool(0.8) {
                clinical_events.push(ClinicalEvent::snomed(
                    id,
                    pick(&mut rng, &ethnicity_codes),
                    random_date(&mut rng, date(2000, 1, 1), study_end),
                ));
            }
        }

        info!(
            "Generated dummy data: {} patients, {} clinical events, {} dispensings",
            patients.len(),
            clinical_events.len(),
            dispensings.len()
        );
        InMemoryEventStore::from_records(patients, clinical_events, dispensings, registrations)
    }
}

/// Codes of a registered list in a stable order for reproducible sampling
fn sorted_codes(registry: &CodeListRegistry, key: &str) -> Result<Vec<String>> {
    let list = registry.get(key)?;
    Ok(list.codes().map(ToString::to_string).sorted().collect())
}

fn pick(rng: &mut StdRng, codes: &[String]) -> String {
    codes[rng.random_range(0..codes.len())].clone()
}

/// Amoxicillin dominates real prescribing, so weight it accordingly
fn weighted_antibiotic_index(rng: &mut StdRng) -> usize {
    match rng.random_range(0..10u32) {
        0..=3 => 0, // amoxicillin
        4 => 1,     // co-amoxiclav
        5 => 2,     // cefalexin
        6 => 3,     // trimethoprim
        7 => 4,     // trimethoprim-sulfamethoxazole
        _ => 5,     // fluoroquinolones
    }
}

fn random_date(rng: &mut StdRng, from: NaiveDate, to: NaiveDate) -> NaiveDate {
    let span = (to - from).num_days().max(0) as u64;
    from.checked_add_days(Days::new(rng.random_range(0..=span)))
        .unwrap_or(from)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
