//! Attribute extraction from feature tables
//!
//! Pulls the declared matching variables out of case and control rows into
//! compact records. A missing column is a configuration error; a missing
//! value in a row drops that row from matching, which is reported, not
//! fatal.

use chrono::NaiveDate;
use log::warn;
use smallvec::SmallVec;

use crate::algorithm::matching::criteria::MatchingConfig;
use crate::error::{CohortError, Result};
use crate::models::{FeatureRow, PatientId};

/// One row's matching attributes
#[derive(Debug, Clone)]
pub struct MatchRecord {
    /// Patient the record belongs to
    pub patient_id: PatientId,
    /// Values of the declared category variables, in declaration order
    pub categories: SmallVec<[String; 2]>,
    /// Values of the declared numeric variables, in declaration order
    pub numerics: SmallVec<[i64; 2]>,
    /// Index date, extracted for case rows only
    pub index_date: Option<NaiveDate>,
}

/// Extract matching records from a feature table
///
/// `with_index_date` is set for the case table, whose index-date column is
/// copied onto each matched set.
pub fn extract_records(
    rows: &[FeatureRow],
    config: &MatchingConfig,
    table: &str,
    with_index_date: bool,
) -> Result<Vec<MatchRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let mut categories = SmallVec::new();
        let mut numerics = SmallVec::new();
        let mut complete = true;

        for column in config.category_columns() {
            let value = row
                .get(column)
                .ok_or_else(|| missing_column(table, column))?;
            match value.as_category() {
                Some(category) => categories.push(category.to_string()),
                None => complete = false,
            }
        }

        for (column, _) in config.tolerance_columns() {
            let value = row
                .get(column)
                .ok_or_else(|| missing_column(table, column))?;
            match value.as_int() {
                Some(number) => numerics.push(number),
                None => complete = false,
            }
        }

        let index_date = if with_index_date {
            row.get(&config.index_date_column)
                .ok_or_else(|| missing_column(table, &config.index_date_column))?
                .as_date()
        } else {
            None
        };

        if complete {
            records.push(MatchRecord {
                patient_id: row.patient_id,
                categories,
                numerics,
                index_date,
            });
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        warn!("Dropped {dropped} {table} rows with incomplete matching attributes");
    }
    Ok(records)
}

fn missing_column(table: &str, column: &str) -> CohortError {
    CohortError::configuration(format!(
        "{table} table has no column named `{column}` required for matching"
    ))
}
