//! Core matching algorithm implementation
//!
//! Greedy stratified nearest-neighbour matching: cases are processed in
//! patient-id order, each taking its nearest unused controls among those
//! agreeing exactly on every category variable and within tolerance on
//! every numeric variable. Ties in distance break randomly, seedable for
//! reproducible runs.

use log::info;
use rand::prelude::*;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::algorithm::matching::control_data::ControlPool;
use crate::algorithm::matching::criteria::MatchingConfig;
use crate::algorithm::matching::extraction::{MatchRecord, extract_records};
use crate::algorithm::matching::types::{MatchedSet, MatchingReport, MatchingResult};
use crate::error::{CohortError, Result};
use crate::models::FeatureRow;

/// Matcher for pairing cases with controls
#[derive(Debug)]
pub struct Matcher {
    config: MatchingConfig,
}

impl Matcher {
    /// Create a new matcher with the given configuration
    #[must_use]
    pub const fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Match every case against the control pool
    ///
    /// Controls are used without replacement. Cases that find no eligible
    /// control are reported unmatched, not failed.
    pub fn perform_matching(
        &self,
        cases: &[FeatureRow],
        controls: &[FeatureRow],
    ) -> Result<MatchingResult> {
        let start_time = Instant::now();
        self.validate()?;

        let case_records = extract_records(cases, &self.config, "case", true)?;
        let control_records = extract_records(controls, &self.config, "control", false)?;

        if case_records.is_empty() {
            return Err(CohortError::data_access(
                "no cases with complete matching attributes".to_string(),
            ));
        }

        info!(
            "Matching {} cases against a pool of {} controls",
            case_records.len(),
            control_records.len()
        );

        let total_controls = control_records.len();
        let pool = ControlPool::new(control_records);

        let mut rng = match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut used: FxHashSet<usize> = FxHashSet::default();
        let mut sets = Vec::new();
        let mut match_count_distribution: BTreeMap<usize, usize> = BTreeMap::new();

        for case in &case_records {
            let selected = self.select_controls(case, &pool, &mut used, &mut rng);
            *match_count_distribution.entry(selected.len()).or_insert(0) += 1;
            if selected.is_empty() {
                continue;
            }
            sets.push(MatchedSet {
                case_id: case.patient_id,
                control_ids: selected
                    .iter()
                    .map(|&idx| pool.records()[idx].patient_id)
                    .collect(),
                index_date: case.index_date,
            });
        }

        let controls_used = used.len();
        let report = MatchingReport {
            total_cases: case_records.len(),
            matched_cases: sets.len(),
            fully_matched_cases: sets
                .iter()
                .filter(|set| set.control_ids.len() == self.config.matches_per_case)
                .count(),
            total_controls,
            controls_used,
            match_count_distribution,
        };

        info!(
            "Matched {} of {} cases using {} controls",
            report.matched_cases, report.total_cases, report.controls_used
        );

        Ok(MatchingResult {
            sets,
            report,
            matching_time: start_time.elapsed(),
        })
    }

    /// Pick up to `matches_per_case` nearest eligible controls for one case
    fn select_controls(
        &self,
        case: &MatchRecord,
        pool: &ControlPool,
        used: &mut FxHashSet<usize>,
        rng: &mut StdRng,
    ) -> SmallVec<[usize; 4]> {
        let (start, end) = match self
            .config
            .tolerance_columns()
            .next()
            .filter(|_| !case.numerics.is_empty())
        {
            Some((_, tolerance)) => pool.candidate_range(case.numerics[0], tolerance),
            None => (0, pool.len()),
        };

        let tolerances: SmallVec<[i64; 2]> = self
            .config
            .tolerance_columns()
            .map(|(_, tolerance)| tolerance)
            .collect();

        let mut eligible: SmallVec<[(usize, i64); 32]> = SmallVec::new();
        for idx in start..end {
            if used.contains(&idx) {
                continue;
            }
            let control = &pool.records()[idx];
            if control.patient_id == case.patient_id {
                continue;
            }
            if control.categories != case.categories {
                continue;
            }
            let mut distance = 0i64;
            let mut within = true;
            for ((case_value, control_value), tolerance) in case
                .numerics
                .iter()
                .zip(control.numerics.iter())
                .zip(tolerances.iter())
            {
                let diff = (case_value - control_value).abs();
                if diff > *tolerance {
                    within = false;
                    break;
                }
                distance += diff;
            }
            if within {
                eligible.push((idx, distance));
            }
        }

        // Random order first, then a stable sort by distance: equal-distance
        // candidates end up in random order
        eligible.shuffle(rng);
        eligible.sort_by_key(|&(_, distance)| distance);

        let mut selected = SmallVec::new();
        for &(idx, _) in eligible.iter().take(self.config.matches_per_case) {
            used.insert(idx);
            selected.push(idx);
        }
        selected
    }

    fn validate(&self) -> Result<()> {
        if self.config.matches_per_case == 0 {
            return Err(CohortError::configuration(
                "matches_per_case must be at least 1",
            ));
        }
        if self.config.variables.is_empty() {
            return Err(CohortError::configuration(
                "matching requires at least one match variable",
            ));
        }
        Ok(())
    }
}
