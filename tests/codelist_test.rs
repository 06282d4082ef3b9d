use std::fs;
use std::path::{Path, PathBuf};

use ehr_cohort::codelist::{CodeList, CodelistError};
use ehr_cohort::study::codelists::{keys, load_study_codelists};

/// Temporary CSV file removed on drop
struct TempCsv {
    path: PathBuf,
}

impl TempCsv {
    fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("ehr-cohort-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        Self { path }
    }
}

impl Drop for TempCsv {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[test]
fn loads_codes_from_the_named_column() {
    let file = TempCsv::new(
        "plain.csv",
        "code,term\n123,First thing\n456,Second thing\n",
    );

    let list = CodeList::from_csv("things", &file.path, "code").unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.contains("123"));
    assert!(list.contains("456"));
    assert!(!list.contains("789"));
}

#[test]
fn loads_categories_when_a_category_column_is_named() {
    let file = TempCsv::new(
        "categorised.csv",
        "code,term,category\n77176002,Smoker,S\n8517006,Ex-smoker,E\n266919005,Never smoked,N\n",
    );

    let list =
        CodeList::from_csv_with_categories("smoking", &file.path, "code", "category").unwrap();
    assert_eq!(list.category_of("77176002"), Some("S"));
    assert_eq!(list.category_of("266919005"), Some("N"));
}

#[test]
fn missing_code_column_fails() {
    let file = TempCsv::new("nocode.csv", "snomed,term\n123,Thing\n");

    let result = CodeList::from_csv("things", &file.path, "code");
    assert!(matches!(
        result,
        Err(CodelistError::MissingColumn { column, .. }) if column == "code"
    ));
}

#[test]
fn unreadable_source_fails() {
    let result = CodeList::from_csv("missing", Path::new("no/such/file.csv"), "code");
    assert!(matches!(result, Err(CodelistError::Unreadable { .. })));
}

#[test]
fn empty_source_fails() {
    let file = TempCsv::new("empty.csv", "code,term\n");

    let result = CodeList::from_csv("empty", &file.path, "code");
    assert!(matches!(result, Err(CodelistError::Empty { .. })));
}

#[test]
fn conflicting_categories_within_one_source_fail() {
    let file = TempCsv::new(
        "conflict.csv",
        "code,category\n123,S\n123,E\n",
    );

    let result = CodeList::from_csv_with_categories("conflict", &file.path, "code", "category");
    assert!(matches!(
        result,
        Err(CodelistError::CategoryConflict { .. })
    ));
}

#[test]
fn the_shipped_study_codelists_load() {
    let registry = load_study_codelists(Path::new("codelists")).unwrap();

    // Eight plain lists, two categorised lists, two unions
    assert_eq!(registry.len(), 12);

    let antibiotics = registry.get(keys::ALL_ANTIBIOTICS).unwrap();
    let amoxicillin = registry.get(keys::AMOXICILLIN).unwrap();
    let fluoroquinolones = registry.get(keys::FLUOROQUINOLONES).unwrap();
    assert!(antibiotics.len() >= amoxicillin.len() + fluoroquinolones.len());

    let combo = registry.get(keys::COMBO_OUTCOME).unwrap();
    let tendinitis = registry.get(keys::TENDINITIS).unwrap();
    assert!(combo.len() > tendinitis.len());

    let smoking = registry.get(keys::SMOKING).unwrap();
    assert_eq!(smoking.category_of("266919005"), Some("N"));
}
