//! Type definitions for the matching algorithm

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::PatientId;

/// One case with its matched controls
#[derive(Debug, Clone, Serialize)]
pub struct MatchedSet {
    /// Patient id of the case
    pub case_id: PatientId,
    /// Patient ids of the matched controls
    pub control_ids: Vec<PatientId>,
    /// Index date carried over from the case row
    pub index_date: Option<NaiveDate>,
}

/// Summary of a matching run
#[derive(Debug, Clone, Serialize)]
pub struct MatchingReport {
    /// Cases with complete matching attributes
    pub total_cases: usize,
    /// Cases that found at least one control
    pub matched_cases: usize,
    /// Cases that found the full requested number of controls
    pub fully_matched_cases: usize,
    /// Controls available in the pool
    pub total_controls: usize,
    /// Controls consumed by matching
    pub controls_used: usize,
    /// Number of cases by how many controls they received
    pub match_count_distribution: BTreeMap<usize, usize>,
}

/// Result of the matching process
#[derive(Debug, Clone)]
pub struct MatchingResult {
    /// Matched sets in case order
    pub sets: Vec<MatchedSet>,
    /// Run summary
    pub report: MatchingReport,
    /// Time taken for matching
    pub matching_time: Duration,
}
