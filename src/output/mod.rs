//! Output sinks
//!
//! CSV writers for feature tables, matched sets and measures, plus a JSON
//! matching report. Every writer receives fully materialised rows, so a
//! fatal failure earlier in the run never leaves a partially written table
//! behind.

use log::info;
use std::fs;
use std::path::Path;

use crate::algorithm::matching::MatchingResult;
use crate::algorithm::measures::MeasureRow;
use crate::error::Result;
use crate::models::{FeatureRow, FeatureValue};

/// Write a derived feature table as CSV
///
/// The first column is the patient id; the rest follow the definition's
/// column order. Booleans render as `true`/`false`, missing values as empty
/// fields.
pub fn write_feature_table(path: &Path, columns: &[&str], rows: &[FeatureRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push("patient_id");
    header.extend_from_slice(columns);
    writer.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(row.patient_id.to_string());
        record.extend(row.values().map(FeatureValue::to_output_field));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write matched case-control pairs as CSV, one row per pair
pub fn write_matched_sets(path: &Path, result: &MatchingResult) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["case_id", "control_id", "set_size", "index_date"])?;

    let mut pairs = 0usize;
    for set in &result.sets {
        let index_date = set
            .index_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        for control_id in &set.control_ids {
            writer.write_record([
                set.case_id.to_string(),
                control_id.to_string(),
                set.control_ids.len().to_string(),
                index_date.clone(),
            ])?;
            pairs += 1;
        }
    }
    writer.flush()?;

    info!("Wrote {} matched pairs to {}", pairs, path.display());
    Ok(())
}

/// Write the matching report as pretty-printed JSON
pub fn write_matching_report(path: &Path, result: &MatchingResult) -> Result<()> {
    ensure_parent(path)?;
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &result.report)?;
    info!("Wrote matching report to {}", path.display());
    Ok(())
}

/// Write measure rows as CSV
pub fn write_measures(path: &Path, rows: &[MeasureRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote {} measure rows to {}", rows.len(), path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientId;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ehr-cohort-output-{}-{name}", std::process::id()))
    }

    #[test]
    fn feature_tables_render_missing_values_as_empty_fields() {
        let mut row = FeatureRow::new(PatientId(7));
        row.push("flag", FeatureValue::Bool(false));
        row.push(
            "seen",
            FeatureValue::Date(NaiveDate::from_ymd_opt(2022, 6, 1)),
        );
        row.push("missing_date", FeatureValue::Date(None));
        row.push("group", FeatureValue::Category(Some("female".to_string())));

        let path = temp_path("table.csv");
        write_feature_table(
            &path,
            &["flag", "seen", "missing_date", "group"],
            &[row],
        )
        .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("patient_id,flag,seen,missing_date,group")
        );
        assert_eq!(lines.next(), Some("7,false,2022-06-01,,female"));
        assert_eq!(lines.next(), None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_tables_still_get_a_header() {
        let path = temp_path("empty.csv");
        write_feature_table(&path, &["flag"], &[]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "patient_id,flag");

        fs::remove_file(&path).unwrap();
    }
}
